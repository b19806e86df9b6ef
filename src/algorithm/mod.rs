/// Winner retirement and compositing into the output canvas
pub mod assembly;
/// Cooperative cancellation shared by the executor and its workers
pub mod cancellation;
/// Normalized Manhattan distance between pixel grids
pub mod distance;
/// Build orchestration over all regions
pub mod executor;
/// Mean-color rejection of hopeless candidates
pub mod prefilter;
/// Parallel best-match search for one region
pub mod reducer;
