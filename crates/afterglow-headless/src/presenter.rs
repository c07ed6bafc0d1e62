use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use afterglow_core::{display, DecayField, ItemFrame, LifecycleEvent, TrailConfig};
use afterglow_platform::{Result, TrailPresenter};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Serialize)]
struct ItemSnapshot<'a> {
    now_ms: u64,
    frames: &'a [ItemFrame],
    events: &'a [LifecycleEvent],
}

/// Writes what a real surface would show: PNG frames of the pixelated field
/// and JSON lines of item snapshots. With no output directory it only
/// counts.
pub struct SnapshotPresenter {
    output_dir: Option<PathBuf>,
    width: u32,
    height: u32,
    display_grid: u32,
    snapshot_every: u64,
    field_frames: u64,
    item_frames: u64,
    item_log: Option<BufWriter<File>>,
    peak_intensity: f32,
    max_items: usize,
}

impl SnapshotPresenter {
    pub fn new(output_dir: Option<PathBuf>, width: u32, height: u32, display_grid: u32, snapshot_every: u64) -> Self {
        Self {
            output_dir,
            width,
            height,
            display_grid,
            snapshot_every: snapshot_every.max(1),
            field_frames: 0,
            item_frames: 0,
            item_log: None,
            peak_intensity: 0.0,
            max_items: 0,
        }
    }

    /// Current display-grid cells per axis, following config changes.
    pub fn display_grid(&self) -> u32 {
        self.display_grid
    }

    pub fn field_frames(&self) -> u64 {
        self.field_frames
    }

    pub fn item_frames(&self) -> u64 {
        self.item_frames
    }

    /// Brightest cell seen over the whole run.
    pub fn peak_intensity(&self) -> f32 {
        self.peak_intensity
    }

    /// Most items held at once over the whole run.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    fn write_png(&self, dir: &Path, field: &DecayField, now_ms: u64) -> Result<()> {
        let intensities = display::render_display(field, self.width, self.height, self.display_grid);
        let pixels = intensities
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect::<Vec<u8>>();
        let image = image::GrayImage::from_raw(self.width, self.height, pixels)
            .ok_or("display buffer does not match surface size")?;
        let path = dir.join(format!("field_{now_ms:06}.png"));
        image.save(&path)?;
        debug!(path = %path.display(), "field snapshot written");
        Ok(())
    }
}

impl TrailPresenter for SnapshotPresenter {
    fn init(&mut self) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)?;
            info!(dir = %dir.display(), "snapshot output ready");
        }
        Ok(())
    }

    fn configure(&mut self, config: &TrailConfig) -> Result<()> {
        self.display_grid = config.display_grid;
        Ok(())
    }

    fn present_field(&mut self, field: &DecayField, now_ms: u64) -> Result<()> {
        self.field_frames += 1;
        let peak = field.cells().iter().copied().fold(0.0f32, f32::max);
        self.peak_intensity = self.peak_intensity.max(peak);

        if self.field_frames % self.snapshot_every == 0 {
            if let Some(dir) = self.output_dir.clone() {
                self.write_png(&dir, field, now_ms)?;
            }
        }
        Ok(())
    }

    fn present_items(&mut self, frames: &[ItemFrame], events: &[LifecycleEvent], now_ms: u64) -> Result<()> {
        self.item_frames += 1;
        self.max_items = self.max_items.max(frames.len());

        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        if events.is_empty() && self.item_frames % self.snapshot_every != 0 {
            return Ok(());
        }
        if self.item_log.is_none() {
            let file = File::create(dir.join("items.jsonl"))?;
            self.item_log = Some(BufWriter::new(file));
        }
        if let Some(log) = self.item_log.as_mut() {
            serde_json::to_writer(&mut *log, &ItemSnapshot { now_ms, frames, events })?;
            log.write_all(b"\n")?;
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(mut log) = self.item_log.take() {
            log.flush()?;
        }
        Ok(())
    }
}
