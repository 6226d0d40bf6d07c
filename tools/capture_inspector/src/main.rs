mod scene;

use std::env;
use std::path::{Path, PathBuf};

use mirrorgate_capture::{CaptureSettings, FrameOutcome, RecordingBackend};

use scene::Scene;

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut scene_path: Option<PathBuf> = None;
    let mut settings_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let Some(value) = args.next() else {
                    eprintln!("--settings expects a path argument");
                    std::process::exit(2);
                };
                settings_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!("Usage: capture_inspector <scene.toml> [--settings <capture.toml>]");
                return;
            }
            other if scene_path.is_none() && !other.starts_with('-') => {
                scene_path = Some(PathBuf::from(other));
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let Some(scene_path) = scene_path else {
        eprintln!("Usage: capture_inspector <scene.toml> [--settings <capture.toml>]");
        std::process::exit(2);
    };

    if let Err(err) = run(&scene_path, settings_path.as_deref()) {
        eprintln!("capture_inspector error: {err}");
        std::process::exit(1);
    }
}

fn run(scene_path: &Path, settings_path: Option<&Path>) -> Result<(), String> {
    let settings_override = settings_path.map(CaptureSettings::load_or_default);
    let mut scene = Scene::load(scene_path, settings_override).map_err(|err| err.to_string())?;

    println!("Scene: {}", scene_path.display());
    println!(
        "Actors: {}, cameras: {}, frames: {}",
        scene.world.len(),
        scene.cameras.len(),
        scene.frames.len()
    );

    let Some(first_frame) = scene.frames.first() else {
        println!("No frames to capture");
        return Ok(());
    };
    let first_context = scene.frame_context(first_frame);
    for camera in &mut scene.cameras {
        camera.begin_play(&scene.world, &first_context);
    }

    let mut backend = RecordingBackend::default();
    let mut skipped = 0usize;
    for (frame_index, frame) in scene.frames.iter().enumerate() {
        let context = scene.frame_context(frame);
        let watched = frame.watched_transform();
        println!(
            "frame {frame_index}: actor @ ({:.2}, {:.2}, {:.2})",
            watched.translation.x, watched.translation.y, watched.translation.z
        );

        for (camera_index, camera) in scene.cameras.iter_mut().enumerate() {
            camera.update_render_target(&context);
            let outcome = camera.update(
                &scene.world,
                &context,
                &mut backend,
                &watched,
                scene.projection,
            );

            if outcome != FrameOutcome::Captured {
                skipped += 1;
                println!("  camera {camera_index}: skipped ({outcome:?})");
                continue;
            }

            let pose = camera.world_transform();
            let forward = pose.forward();
            let plane = camera
                .clip_plane()
                .map(|plane| {
                    format!(
                        "n=({:.2}, {:.2}, {:.2}) p=({:.2}, {:.2}, {:.2})",
                        plane.normal.x,
                        plane.normal.y,
                        plane.normal.z,
                        plane.point.x,
                        plane.point.y,
                        plane.point.z
                    )
                })
                .unwrap_or_else(|| "none".to_owned());
            println!(
                "  camera {camera_index} ({:?}): pos=({:.2}, {:.2}, {:.2}) fwd=({:.2}, {:.2}, {:.2}) clip[{plane}] target={}px gen={}{}",
                camera.camera_type(),
                pose.translation.x,
                pose.translation.y,
                pose.translation.z,
                forward.x,
                forward.y,
                forward.z,
                camera.cached_render_size(),
                camera.render_target_generation(),
                if camera.is_total_reflection() {
                    " total-reflection"
                } else {
                    ""
                },
            );
        }
    }

    println!("Captures: {}, skipped: {skipped}", backend.len());
    Ok(())
}
