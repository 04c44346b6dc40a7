use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Responsible for logging the statistics with the provided prefix; used to tell apart the
/// statistics of the different workers and of nested strategies (e.g. the fallback search of the
/// MILP strategy).
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    /// The prefix which will be attached to the statistic name
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new<Input: IntoIterator<Item = impl Display>>(name_prefix: Input) -> Self {
        Self {
            name_prefix: name_prefix.into_iter().join("_"),
        }
    }

    /// Attaches the provided `addition_to_prefix` to the stored internal prefix and returns a new
    /// [`StatisticLogger`] with these two prefixes.
    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        let name_prefix = if self.name_prefix.is_empty() {
            addition_to_prefix.to_string()
        } else {
            format!("{}_{}", self.name_prefix, addition_to_prefix)
        };

        Self { name_prefix }
    }

    pub fn log_statistic(&self, value: impl Display) {
        log_statistic(&self.name_prefix, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_joined_with_underscores() {
        let logger = StatisticLogger::new(["worker", "3"]).attach_to_prefix("nodes");

        assert_eq!(logger.name_prefix, "worker_3_nodes");
    }

    #[test]
    fn empty_prefix_is_not_separated() {
        let logger = StatisticLogger::default().attach_to_prefix("problems");

        assert_eq!(logger.name_prefix, "problems");
    }
}
