use std::hint::black_box;
use std::time::Instant;

use peerspace_input::Key;
use peerspace_rig::CameraRig;

fn bench_integrate(frames: usize) {
    let mut rig = CameraRig::default();
    rig.on_pointer_lock_change(true);
    rig.on_key_change(Key::W, true);
    rig.on_key_change(Key::D, true);

    let start = Instant::now();
    for i in 0..frames {
        rig.on_look_delta(black_box((i % 7) as f32), black_box((i % 3) as f32 - 1.0));
        rig.integrate(black_box(1.0 / 60.0));
    }
    let elapsed = start.elapsed();
    println!(
        "integrate: {frames} frames in {elapsed:?} ({:.1} ns/frame), final position {:?}",
        elapsed.as_nanos() as f64 / frames as f64,
        rig.position()
    );
}

fn main() {
    println!("=== Camera rig integration benchmark ===");
    for frames in [1_000, 100_000, 1_000_000] {
        bench_integrate(frames);
    }
}
