/*
 * Boid Flocking Viewer
 *
 * Opens a window showing a 3D flock from above. The panel toggles the four
 * steering rules, tunes their weights, switches between brute-force and
 * spatial grid neighbor search and shows how many distance checks each one
 * performs.
 *
 * Log verbosity follows RUST_LOG, e.g. `RUST_LOG=flock_grid=trace`.
 */

mod viewer;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    nannou::app(viewer::app::model)
        .update(viewer::app::update)
        .run();
}
