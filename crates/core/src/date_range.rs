use crate::error::AdapterError;
use crate::types::{DateRangeSpec, ResolvedDateRange};
use chrono::{Duration, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAlias {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
}

impl DateAlias {
    pub const ALL: [DateAlias; 4] = [
        DateAlias::Today,
        DateAlias::Yesterday,
        DateAlias::Last7Days,
        DateAlias::Last30Days,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DateAlias::Today => "today",
            DateAlias::Yesterday => "yesterday",
            DateAlias::Last7Days => "last7days",
            DateAlias::Last30Days => "last30days",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alias| alias.name() == name)
    }

    /// Inclusive length of the range in days.
    pub fn span_days(self) -> i64 {
        match self {
            DateAlias::Today | DateAlias::Yesterday => 1,
            DateAlias::Last7Days => 7,
            DateAlias::Last30Days => 30,
        }
    }

    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = match self {
            DateAlias::Yesterday => today - Duration::days(1),
            _ => today,
        };
        (end - Duration::days(self.span_days() - 1), end)
    }
}

fn valid_aliases() -> String {
    DateAlias::ALL
        .iter()
        .map(|alias| alias.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves against the local calendar date at call time.
pub fn resolve_date_range(spec: &DateRangeSpec) -> Result<ResolvedDateRange, AdapterError> {
    resolve_date_range_at(spec, Local::now().date_naive())
}

pub fn resolve_date_range_at(
    spec: &DateRangeSpec,
    today: NaiveDate,
) -> Result<ResolvedDateRange, AdapterError> {
    match spec {
        DateRangeSpec::Alias(name) => {
            let alias = DateAlias::parse(name).ok_or_else(|| {
                AdapterError::Validation(format!(
                    "Unknown date range alias: {}. Valid aliases: {}",
                    name,
                    valid_aliases()
                ))
            })?;
            let (start, end) = alias.bounds(today);
            Ok(ResolvedDateRange {
                start_date: start.format(DATE_FORMAT).to_string(),
                end_date: end.format(DATE_FORMAT).to_string(),
            })
        }
        DateRangeSpec::Explicit {
            start_date,
            end_date,
        } => match (non_empty(start_date), non_empty(end_date)) {
            (Some(start_date), Some(end_date)) => Ok(ResolvedDateRange {
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            }),
            _ => Err(AdapterError::Validation(
                "Date range dict must include start_date and end_date".to_string(),
            )),
        },
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
