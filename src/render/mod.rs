mod cache;
mod worker;

pub use cache::{PageFrames, render_plan};
pub use worker::{RenderKey, RenderWorker, RenderWorkerResult};
