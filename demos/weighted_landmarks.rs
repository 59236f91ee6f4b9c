//! Example: weighted landmark association on a synthetic scene
//!
//! Two random landmark clouds share 20 noisy correspondences. The matcher
//! filters candidates by size agreement, weights the survivors, and lets the
//! consistency solver pick a mutually consistent subset.
//!
//! Run with `RUST_LOG=debug` to see the pipeline's logging.

use tracing_subscriber::EnvFilter;
use weighted_clipper::synthetic::{SyntheticConfig, make_synthetic_landmarks};
use weighted_clipper::{EuclideanLandmarkMatcher, MatcherSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Weighted Landmark Association Example ===\n");

    let scene = make_synthetic_landmarks(&SyntheticConfig::default())?;
    println!(
        "Set 1: {} landmarks, set 2: {} landmarks, {} planted correspondences\n",
        scene.set1.len(),
        scene.set2.len(),
        scene.planted.len()
    );

    let matcher = EuclideanLandmarkMatcher::new(MatcherSettings::new(0.05, 0.40))?;
    let result = matcher.find_associations(&scene.set1, &scene.set2)?;

    println!(
        "Candidates: {} dense, {} after size filtering",
        result.candidate_count,
        result.viable.len()
    );
    println!("Selected associations (idx1 -> idx2):");
    for (i1, i2) in result.pairs() {
        println!("  {i1:>3} -> {i2:>3}");
    }
    println!("\nSelected: {} associations", result.selected.len());

    let hits = scene.hits(&result.pairs());
    println!("Hits on planted correspondences: {}/{}", hits, scene.planted.len());

    Ok(())
}
