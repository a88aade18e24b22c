use anyhow::{Context, Result};
use std::time::Instant;
use text_regions::{crop, save_stages, TextDetector};

fn run() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let path = args.next().expect("Usage: detect IMAGE [SAVEDIR]");
    let savedir = args.next();

    let img = image::open(&path).with_context(|| format!("Failed to open {}", path))?;
    eprintln!("read image from {}", path);
    let detector = TextDetector::default();
    let t0 = Instant::now();
    let stages = detector.detect_stages(&img)?;
    println!("detect took {:?}", t0.elapsed());

    let detection = &stages.detection;
    if detection.is_empty() {
        println!("no text found");
    }
    println!("text region: {:?}", detection.rect);
    detection.mask.save("mask.png")?;
    crop(&stages.grey, detection.rect).save("crop.png")?;

    if let Some(dir) = savedir {
        let paths = save_stages(&dir, &stages)
            .with_context(|| format!("Failed to save stages in {}", dir))?;
        eprintln!("saved {} stage images in {}", paths.len(), dir);
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:?}", err);
    }
}
