mod match_evaluator;

pub use match_evaluator::MatchEvaluator;
