pub mod benchmark;
pub mod config;
pub mod corpus;
pub mod models;
pub mod plots;
pub mod report;
pub mod stats;
pub mod storage;

pub use benchmark::{BenchmarkResult, Benchmarker, ModelPlan, plan_runs};
pub use config::{BenchConfig, ModelGroup};
pub use corpus::{InputText, get_articles};
pub use models::{ModelController, NoopController, OllamaCli};
pub use plots::plot_benchmark;
pub use stats::{GroupSummary, summarize};
