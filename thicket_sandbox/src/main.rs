mod config;
mod obj_export;

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use thicket_core::SceneSink;
use thicket_flock::Flock;
use thicket_world::{PlantGenerator, StreetGenerator, UfoGenerator};

use crate::config::{SandboxConfig, Trigger};
use crate::obj_export::ObjWriter;

/// Every structure generator, rebuilt together on a regenerate trigger
struct Structures {
    plants: PlantGenerator,
    streets: StreetGenerator,
    ufos: UfoGenerator,
}

impl Structures {
    fn new(config: &SandboxConfig) -> Result<Self, Box<dyn Error>> {
        let mut structures = Self {
            plants: PlantGenerator::new(config.plants.clone())?,
            streets: StreetGenerator::new(config.streets.clone())?,
            ufos: UfoGenerator::new(config.ufos.clone())?,
        };
        structures.regenerate()?;
        Ok(structures)
    }

    fn regenerate(&mut self) -> Result<(), Box<dyn Error>> {
        self.plants.regenerate()?;
        self.streets.regenerate()?;
        self.ufos.regenerate()?;
        Ok(())
    }

    fn emit(&self, sink: &mut dyn SceneSink) {
        self.plants.emit(sink);
        self.streets.emit(sink);
        self.ufos.emit(sink);
    }
}

fn export(path: &Path, emit: impl FnOnce(&mut dyn SceneSink)) -> Result<(), Box<dyn Error>> {
    let mut writer = ObjWriter::new(BufWriter::new(File::create(path)?));
    emit(&mut writer);
    let objects = writer.objects();
    writer.finish()?;
    log::info!("Wrote {} objects to {}", objects, path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== THICKET SANDBOX ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => SandboxConfig::load(&PathBuf::from(path))?,
        None => {
            log::info!("No config given, using defaults");
            SandboxConfig::default()
        }
    };

    let mut flock = Flock::new(config.flock.clone())?;
    let mut structures = Structures::new(&config)?;

    let run = &config.run;
    println!("[RUN] {} ticks at dt {:.4}s", run.ticks, run.dt);

    for tick in 0..run.ticks {
        for trigger in config.triggers_at(tick) {
            match *trigger {
                Trigger::Scatter { .. } => flock.scatter(),
                Trigger::Resize { count, .. } => flock.resize(count),
                Trigger::Regenerate { .. } => structures.regenerate()?,
            }
        }

        flock.tick(run.dt);
        structures.ufos.animate(flock.elapsed());

        if run.report_every > 0 && tick % run.report_every == 0 {
            let agents = flock.agents();
            let mean_speed = agents.iter().map(|a| a.speed()).sum::<f32>() / agents.len().max(1) as f32;
            log::info!("tick {}: {} agents, mean speed {:.2}", tick, agents.len(), mean_speed);
        }
    }

    if run.export_obj {
        fs::create_dir_all(&run.output_dir)?;
        export(&run.output_dir.join("structures.obj"), |sink| structures.emit(sink))?;
        export(&run.output_dir.join("flock.obj"), |sink| flock.emit(sink))?;
    }

    println!("[DONE] {} agents after {:.2}s simulated", flock.len(), flock.elapsed());
    Ok(())
}
