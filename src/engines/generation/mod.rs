pub mod tree;
pub mod init;
pub mod operators;
pub mod pareto;
pub mod selection;
pub mod archive;
pub mod transient;
pub mod logbook;
pub mod evolution_engine;
pub mod progress;

pub use tree::{ExpressionTree, Individual, Lineage};
pub use archive::ParetoArchive;
pub use transient::{
    CandidateScorer, CandidateStats, FrequencyScorer, ImprovementScorer, TransientEntry, TransientSet,
    TransientUpdate,
};
pub use evolution_engine::{
    EngineState, EvolutionEngine, GenerationOutcome, OperatorCounts, ProgressCallback, RunOutcome,
};
pub use logbook::{GenerationRecord, Logbook, PopulationStats};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage, SilentProgressCallback};
pub use operators::MAX_TREE_HEIGHT;
