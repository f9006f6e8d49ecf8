// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Startup, the render loop, and the one place fatal errors are decided.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use veneer_core::plane::PlaneId;
use veneer_core::trace::Tracer;
use veneer_render::{GpuBackend, StreamingDriver};

use crate::composer::{FrameComposer, FrameOutcome};
use crate::config::CompositorConfig;
use crate::error::RuntimeError;
use crate::ingest::{IngestWorker, spawn_worker};
use crate::store::PlaneStateStore;
use crate::transport::{FifoEndpoint, TransportEndpoint};

/// Owns the plane store and the ingestion workers, and drives a
/// [`FrameComposer`] until quit or a fatal error.
#[derive(Debug)]
pub struct Supervisor {
    config: CompositorConfig,
    store: Arc<PlaneStateStore>,
    fatal_tx: Sender<RuntimeError>,
    fatal_rx: Receiver<RuntimeError>,
    workers: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Validates `config` and builds an empty plane store for it.
    pub fn new(config: CompositorConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let store = Arc::new(PlaneStateStore::new(config.graphics_planes, config.video_planes));
        let (fatal_tx, fatal_rx) = unbounded();
        Ok(Self {
            config,
            store,
            fatal_tx,
            fatal_rx,
            workers: Vec::new(),
        })
    }

    /// The compositor configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// The shared plane store.
    #[must_use]
    pub fn store(&self) -> &Arc<PlaneStateStore> {
        &self.store
    }

    /// Worker threads started so far.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Starts an ingestion worker for `plane` reading from `endpoint`.
    pub fn spawn<T: TransportEndpoint>(&mut self, plane: PlaneId, endpoint: T) -> Result<(), RuntimeError> {
        let worker = IngestWorker::new(plane, Arc::clone(&self.store), endpoint, self.config.close_grace());
        let handle =
            spawn_worker(worker, self.fatal_tx.clone()).map_err(|source| RuntimeError::Spawn { plane, source })?;
        self.workers.push(handle);
        Ok(())
    }

    /// Starts one worker per configured plane on its named pipe, creating
    /// missing pipes when configured to.
    pub fn start_fifo_workers(&mut self) -> Result<(), RuntimeError> {
        let planes: Vec<_> = self.config.planes().collect();
        for plane in planes {
            let endpoint = FifoEndpoint::new(self.config.pipe_path(plane));
            if self.config.create_pipes {
                let created = endpoint.ensure_exists().map_err(|source| RuntimeError::Pipe {
                    path: endpoint.describe(),
                    source,
                })?;
                if created {
                    tracing::info!(%plane, path = %endpoint.describe(), "created pipe");
                }
            }
            self.spawn(plane, endpoint)?;
        }
        tracing::info!(workers = self.workers.len(), "ingestion started");
        Ok(())
    }

    /// Builds a composer over this supervisor's store.
    #[must_use]
    pub fn composer<B: GpuBackend, D: StreamingDriver>(&self, backend: B, driver: D) -> FrameComposer<B, D> {
        FrameComposer::new(Arc::clone(&self.store), backend, driver, &self.config)
    }

    /// Runs the render loop until `quit` is set or something fatal happens.
    ///
    /// Either way the composer is shut down before returning. Ingestion
    /// threads are left running; they end with the process.
    pub fn run<B: GpuBackend, D: StreamingDriver>(
        &mut self,
        composer: &mut FrameComposer<B, D>,
        quit: &AtomicBool,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RuntimeError> {
        let result = self.render_until(composer, quit, tracer);
        if let Err(e) = &result {
            tracing::error!(error = %e, "compositor stopping");
        }
        let teardown = composer.shutdown();
        result.and(teardown)
    }

    fn render_until<B: GpuBackend, D: StreamingDriver>(
        &mut self,
        composer: &mut FrameComposer<B, D>,
        quit: &AtomicBool,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RuntimeError> {
        let idle_sleep = self.config.idle_sleep();
        while !quit.load(Ordering::Acquire) {
            self.check_workers()?;
            let now = std::time::Instant::now();
            if composer.step(now, tracer)? == FrameOutcome::Idle {
                thread::sleep(idle_sleep);
            }
        }
        tracing::info!("quit requested");
        Ok(())
    }

    fn check_workers(&mut self) -> Result<(), RuntimeError> {
        // A worker sends before it exits, so sample liveness first.
        let all_done = !self.workers.is_empty() && self.workers.iter().all(JoinHandle::is_finished);
        if let Ok(e) = self.fatal_rx.try_recv() {
            return Err(e);
        }
        if all_done {
            return Err(RuntimeError::WorkersGone);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::transport::MemoryEndpoint;
    use std::time::{Duration, Instant};
    use veneer_core::ConfigError;
    use veneer_core::format::FourCc;
    use veneer_core::plane::{
        BlendMode, CropRect, OutputRect, OverlayOrder, PhysAddr, PlaneDescriptor, PlaneInput,
        PlaneRole,
    };
    use veneer_core::record::VideoRecord;
    use veneer_render::{GpuCall, RecordingBackend, SoftwareDriver};

    fn small_config() -> CompositorConfig {
        CompositorConfig {
            graphics_planes: 1,
            video_planes: 1,
            idle_sleep_ms: 1,
            ..CompositorConfig::default()
        }
    }

    #[test]
    fn quit_before_start_still_shuts_down() {
        let mut sup = Supervisor::new(small_config()).unwrap();
        let mut composer = sup.composer(RecordingBackend::new(), SoftwareDriver::new());
        let quit = AtomicBool::new(true);
        sup.run(&mut composer, &quit, &mut Tracer::none()).unwrap();
        assert_eq!(composer.backend().calls(), [GpuCall::Release]);
    }

    #[test]
    fn presents_published_planes_until_quit() {
        let mut sup = Supervisor::new(small_config()).unwrap();
        let desc = PlaneDescriptor {
            enabled: true,
            input_valid: true,
            input: PlaneInput {
                buffers: vec![PhysAddr(0x9000_0000)],
                width: 64,
                height: 64,
                format: FourCc::RGB565,
                rotation_degrees: 0.0,
                crop: CropRect::default(),
            },
            output_valid: true,
            output: OutputRect::FULLSCREEN,
            role: PlaneRole::Graphics {
                blend: BlendMode::Opaque,
            },
        };
        sup.store().graphics()[0].publish(desc, Instant::now());

        let mut composer = sup.composer(RecordingBackend::counting(), SoftwareDriver::new());
        let quit = Arc::new(AtomicBool::new(false));
        let stopper = {
            let quit = Arc::clone(&quit);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                quit.store(true, Ordering::Release);
            })
        };
        sup.run(&mut composer, &quit, &mut Tracer::none()).unwrap();
        stopper.join().unwrap();

        assert!(composer.backend().presents() > 0, "frames were presented");
        assert_eq!(composer.backend().live_textures(), 0, "textures released");
        assert_eq!(composer.texture_manager().devices_in_use(), 0, "devices released");
    }

    #[test]
    fn worker_config_error_stops_the_loop() {
        let mut sup = Supervisor::new(small_config()).unwrap();
        let (ep, producer) = MemoryEndpoint::pair("vid0");
        let mut bad = VideoRecord::config(&PlaneDescriptor {
            enabled: true,
            input_valid: true,
            input: PlaneInput {
                buffers: vec![PhysAddr(0x8000_0000)],
                width: 64,
                height: 64,
                format: FourCc::UYVY,
                rotation_degrees: 0.0,
                crop: CropRect::default(),
            },
            output_valid: true,
            output: OutputRect::FULLSCREEN,
            role: PlaneRole::Video {
                overlay: OverlayOrder::default(),
            },
        });
        bad.count = 17;
        assert!(producer.connect(bytemuck::bytes_of(&bad).to_vec()));
        sup.spawn(PlaneId::video(0), ep).unwrap();

        let mut composer = sup.composer(RecordingBackend::new(), SoftwareDriver::new());
        let quit = AtomicBool::new(false);
        let err = sup.run(&mut composer, &quit, &mut Tracer::none()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Ingest(IngestError::Config {
                source: ConfigError::TooManyBuffers { count: 17, .. },
                ..
            })
        ));
        assert_eq!(composer.backend().calls().last(), Some(&GpuCall::Release));
        drop(producer);
    }

    #[test]
    fn unusable_pipe_directory_is_reported() {
        let blocker = std::env::temp_dir().join(format!("veneer-not-a-dir-{}", std::process::id()));
        std::fs::write(&blocker, b"").unwrap();
        let config = CompositorConfig {
            pipe_dir: blocker.join("pipes"),
            ..small_config()
        };
        let mut sup = Supervisor::new(config).unwrap();
        let err = sup.start_fifo_workers().unwrap_err();
        assert!(matches!(err, RuntimeError::Pipe { .. }));
        assert_eq!(sup.worker_count(), 0);
        std::fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let config = CompositorConfig {
            video_planes: 9,
            ..CompositorConfig::default()
        };
        assert!(matches!(Supervisor::new(config), Err(RuntimeError::Settings(_))));
    }
}
