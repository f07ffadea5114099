//! The seven-stage crate design pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use u_crating_assembly::{
    build_bill_of_materials, calculate_hardware, BillOfMaterials, CrateAssembler, CrateGeometry,
    HardwareLayout,
};
use u_crating_core::{CrateConfiguration, Error, ProgressCallback, ProgressInfo, Result, Stage};
use u_crating_layout::MaterialUsage;
use u_crating_nx::{calculate_markings, generate_expressions, ExpressionSet, MarkingSet};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Everything the pipeline derives from one configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CrateDesign {
    /// The input configuration.
    pub config: CrateConfiguration,
    /// Structural blocks and bounding box.
    pub geometry: CrateGeometry,
    /// Klimp and lag screw placements.
    pub hardware: HardwareLayout,
    /// Sized markings.
    pub markings: MarkingSet,
    /// NX expressions.
    pub expressions: ExpressionSet,
    /// Purchasable stock.
    pub bom: BillOfMaterials,
    /// Plywood usage over all panels.
    pub material_usage: MaterialUsage,
    /// Wall time of the run, milliseconds.
    pub computation_time_ms: u64,
}

/// Runs the design pipeline for one configuration at a time.
///
/// Every run starts from fresh, read-only catalogs and returns a new output
/// graph. Cancellation is cooperative and checked between stages.
#[derive(Debug, Default)]
pub struct CratePipeline {
    cancelled: Arc<AtomicBool>,
}

impl CratePipeline {
    /// Creates a pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every stage.
    pub fn run(&self, config: &CrateConfiguration) -> Result<CrateDesign> {
        self.execute(config, None)
    }

    /// Runs every stage, reporting after each one.
    pub fn run_with_progress(
        &self,
        config: &CrateConfiguration,
        callback: ProgressCallback,
    ) -> Result<CrateDesign> {
        self.execute(config, Some(&callback))
    }

    /// Requests cancellation of the current run.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Shared flag that cancels the current run when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn execute(
        &self,
        config: &CrateConfiguration,
        callback: Option<&ProgressCallback>,
    ) -> Result<CrateDesign> {
        let start = Instant::now();
        self.cancelled.store(false, Ordering::Relaxed);
        config.validate()?;

        let checkpoint = |stage: Stage| {
            log::debug!("stage {} done after {:?}", stage, start.elapsed());
            if let Some(cb) = callback {
                cb(ProgressInfo::completed(stage, start.elapsed().as_millis() as u64));
            }
        };
        let proceed = || -> Result<()> {
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("pipeline cancelled after {:?}", start.elapsed());
                return Err(Error::Cancelled);
            }
            Ok(())
        };

        let assembler = CrateAssembler::new(config);

        proceed()?;
        let catalog = assembler.lumber()?;
        checkpoint(Stage::Lumber);

        proceed()?;
        let skids = assembler.skids()?;
        let dims = assembler.dimensions(&skids);
        checkpoint(Stage::Skids);

        proceed()?;
        let floor = assembler.floor(catalog, &dims)?;
        checkpoint(Stage::Floor);

        proceed()?;
        let plywood = assembler.plywood(&dims)?;
        checkpoint(Stage::Plywood);

        proceed()?;
        let panels = assembler.cleats(&dims, plywood)?;
        checkpoint(Stage::Cleats);

        proceed()?;
        let geometry = assembler.geometry(dims, skids, floor, panels)?;
        let hardware = calculate_hardware(&geometry);
        checkpoint(Stage::Geometry);

        proceed()?;
        let markings = calculate_markings(&config.markings, geometry.dimensions.overall_height);
        let expressions = generate_expressions(&geometry, &markings, &hardware)?;
        let bom = build_bill_of_materials(config, &geometry, &hardware);
        let material_usage = bom.plywood;
        checkpoint(Stage::Expressions);

        let computation_time_ms = start.elapsed().as_millis() as u64;
        log::debug!(
            "pipeline finished: {} blocks, {} expressions in {}ms",
            geometry.block_count(),
            expressions.len(),
            computation_time_ms
        );

        Ok(CrateDesign {
            config: config.clone(),
            geometry,
            hardware,
            markings,
            expressions,
            bom,
            material_usage,
            computation_time_ms,
        })
    }
}

/// Runs the pipeline once with a fresh [`CratePipeline`].
pub fn design_crate(config: &CrateConfiguration) -> Result<CrateDesign> {
    CratePipeline::new().run(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_reports_every_stage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = CratePipeline::new();
        let design = pipeline
            .run_with_progress(
                &CrateConfiguration::default(),
                Box::new(move |info: ProgressInfo| sink.lock().unwrap().push(info)),
            )
            .unwrap();

        let seen = seen.lock().unwrap();
        let stages: Vec<Stage> = seen.iter().map(|p| p.stage).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert!(seen.iter().all(|p| p.total == 7));
        assert!(seen.last().unwrap().is_finished());
        assert!(!design.expressions.is_empty());
    }

    #[test]
    fn test_cancel_between_stages() {
        let pipeline = CratePipeline::new();
        let flag = pipeline.cancel_handle();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let result = pipeline.run_with_progress(
            &CrateConfiguration::default(),
            Box::new(move |info: ProgressInfo| {
                sink.lock().unwrap().push(info.stage);
                if info.stage == Stage::Skids {
                    flag.store(true, Ordering::Relaxed);
                }
            }),
        );
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(*seen.lock().unwrap(), vec![Stage::Lumber, Stage::Skids]);
    }

    #[test]
    fn test_run_resets_cancellation() {
        let pipeline = CratePipeline::new();
        pipeline.cancel();
        assert!(pipeline.run(&CrateConfiguration::default()).is_ok());
    }

    #[test]
    fn test_invalid_configuration_reports_no_progress() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let config = CrateConfiguration::new().with_weight(f64::NAN);
        let callback: ProgressCallback =
            Box::new(move |_: ProgressInfo| flag.store(true, Ordering::Relaxed));
        let err = CratePipeline::new()
            .run_with_progress(&config, callback)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
        assert!(!called.load(Ordering::Relaxed));
    }
}
