// Error grouping for 4xx gateway rows
//
// Level 1: (response code, error code) groups with lookup name/description
// Level 2: operation types inside each group, with clients and an example message

mod message;
mod types;

pub use message::resolve_message;
pub use types::{ErrorGroup, OperationTypeStat, SkipStats};

use crate::codes::ErrorCodeTable;
use crate::records::{LogField, LogRecord, CLIENT_ERRORS};
use ahash::{HashMap, HashMapExt};
use std::collections::BTreeSet;

/// Client recorded for rows without a client identifier
pub const NO_CLIENT: &str = "-";

#[derive(Debug, Clone)]
struct PartialOperation {
    first_seen: usize,
    count: usize,
    example_message: String,
    clients: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct PartialGroup {
    first_seen: usize,
    count: usize,
    name: String,
    description: String,
    operations: HashMap<String, PartialOperation>,
}

/// Accumulates error groups over a sequence of records
///
/// Each record is observed with its position in the input. Positions decide
/// which message becomes an operation's example and how equal counts are
/// ordered, so accumulators built over disjoint shards and combined with
/// [`GroupAccumulator::merge`] finish to the same groups as one sequential
/// pass.
#[derive(Debug, Clone)]
pub struct GroupAccumulator<'a> {
    codes: &'a ErrorCodeTable,
    groups: HashMap<(u16, i64), PartialGroup>,
    skips: SkipStats,
}

impl<'a> GroupAccumulator<'a> {
    pub fn new(codes: &'a ErrorCodeTable) -> Self {
        Self {
            codes,
            groups: HashMap::new(),
            skips: SkipStats::default(),
        }
    }

    /// Fold one record into the groups
    ///
    /// Rows outside 400..=499 are ignored. Client error rows missing a
    /// grouping field, and rows carrying non-numeric codes, are skipped and
    /// counted.
    pub fn observe(&mut self, position: usize, record: &LogRecord) {
        let (Some(response), Some(error_code), Some(operation_type)) = (
            record.get(LogField::Response),
            record.get(LogField::ErrorCode),
            record.get(LogField::OperationType),
        ) else {
            // Only client errors could have formed a group
            if record.client_error_code().is_some() {
                tracing::debug!(position, "Skipping row with missing required fields");
                self.skips.missing_fields += 1;
            }
            return;
        };

        let Ok(response_code) = response.trim().parse::<u16>() else {
            tracing::debug!(position, response, "Skipping row with non-numeric response");
            self.skips.invalid_response += 1;
            return;
        };
        if !CLIENT_ERRORS.contains(&response_code) {
            return;
        }

        let Ok(error_code) = error_code.trim().parse::<i64>() else {
            tracing::debug!(position, error_code, "Skipping row with invalid error code");
            self.skips.invalid_error_code += 1;
            return;
        };

        let codes = self.codes;
        let group = self
            .groups
            .entry((response_code, error_code))
            .or_insert_with(|| {
                let info = codes.lookup(error_code);
                PartialGroup {
                    first_seen: position,
                    count: 0,
                    name: info.name,
                    description: info.description,
                    operations: HashMap::new(),
                }
            });
        group.count += 1;

        let operation = group
            .operations
            .entry(operation_type.to_string())
            .or_insert_with(|| PartialOperation {
                first_seen: position,
                count: 0,
                example_message: resolve_message(record.get(LogField::ErrorMessage)),
                clients: BTreeSet::new(),
            });
        operation.count += 1;
        operation.clients.insert(
            record
                .get(LogField::ClientString)
                .unwrap_or(NO_CLIENT)
                .to_string(),
        );
    }

    /// Combine with an accumulator built over another shard
    ///
    /// Counts add, client sets union, and the earliest-seen example message
    /// is kept.
    pub fn merge(mut self, other: Self) -> Self {
        for (key, theirs) in other.groups {
            match self.groups.get_mut(&key) {
                None => {
                    self.groups.insert(key, theirs);
                }
                Some(ours) => {
                    ours.count += theirs.count;
                    ours.first_seen = ours.first_seen.min(theirs.first_seen);
                    for (op_name, their_op) in theirs.operations {
                        match ours.operations.get_mut(&op_name) {
                            None => {
                                ours.operations.insert(op_name, their_op);
                            }
                            Some(our_op) => {
                                our_op.count += their_op.count;
                                if their_op.first_seen < our_op.first_seen {
                                    our_op.first_seen = their_op.first_seen;
                                    our_op.example_message = their_op.example_message;
                                }
                                our_op.clients.extend(their_op.clients);
                            }
                        }
                    }
                }
            }
        }
        self.skips = self.skips.merge(other.skips);
        self
    }

    /// Produce the sorted groups
    ///
    /// Groups and operations are ordered by count, descending; equal counts
    /// keep first-seen order.
    pub fn finish(self) -> (Vec<ErrorGroup>, SkipStats) {
        let mut groups: Vec<(usize, ErrorGroup)> = self
            .groups
            .into_iter()
            .map(|((response_code, error_code), partial)| {
                let mut operations: Vec<(usize, OperationTypeStat)> = partial
                    .operations
                    .into_iter()
                    .map(|(operation_type, op)| {
                        (
                            op.first_seen,
                            OperationTypeStat {
                                operation_type,
                                count: op.count,
                                example_message: op.example_message,
                                clients: op.clients.into_iter().collect(),
                            },
                        )
                    })
                    .collect();
                operations.sort_by(|(a_seen, a), (b_seen, b)| {
                    b.count.cmp(&a.count).then(a_seen.cmp(b_seen))
                });

                (
                    partial.first_seen,
                    ErrorGroup {
                        response_code,
                        error_code,
                        count: partial.count,
                        name: partial.name,
                        description: partial.description,
                        operation_types: operations.into_iter().map(|(_, op)| op).collect(),
                    },
                )
            })
            .collect();

        groups.sort_by(|(a_seen, a), (b_seen, b)| b.count.cmp(&a.count).then(a_seen.cmp(b_seen)));

        (
            groups.into_iter().map(|(_, group)| group).collect(),
            self.skips,
        )
    }
}

/// Group a record sequence in one pass
pub fn aggregate<'r, I>(records: I, codes: &ErrorCodeTable) -> Vec<ErrorGroup>
where
    I: IntoIterator<Item = &'r LogRecord>,
{
    let mut accumulator = GroupAccumulator::new(codes);
    for (position, record) in records.into_iter().enumerate() {
        accumulator.observe(position, record);
    }
    accumulator.finish().0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(response: &str, code: &str, op: &str, message: &str, client: &str) -> LogRecord {
        LogRecord::from_pairs([
            ("response", response),
            ("error_code", code),
            ("operation_type", op),
            ("error_message", message),
            ("x-stream-client", client),
        ])
    }

    fn sample() -> Vec<LogRecord> {
        vec![
            row("400", "4", "UpdateUsers", r#"{"message": "Input error occurred"}"#, ""),
            row("400", "4", "UpdateUsers", r#"{"message": "Another input error"}"#, ""),
            row("401", "5", "QueryChannels", r#"{"message": "Authentication failed"}"#, ""),
            row("404", "16", "GetMessage", r#"{"message": "Resource not found"}"#, ""),
        ]
    }

    #[test]
    fn test_groups_by_response_and_code() {
        let codes = ErrorCodeTable::builtin();
        let groups = aggregate(&sample(), &codes);

        assert_eq!(groups.len(), 3);
        let bad_request = &groups[0];
        assert_eq!(bad_request.response_code, 400);
        assert_eq!(bad_request.error_code, 4);
        assert_eq!(bad_request.count, 2);
        assert_eq!(bad_request.description, codes.lookup(4).description);
        assert_eq!(bad_request.operation_types.len(), 1);
        assert_eq!(bad_request.operation_types[0].operation_type, "UpdateUsers");
        assert_eq!(bad_request.operation_types[0].count, 2);
        assert_eq!(
            bad_request.operation_types[0].example_message,
            "Input error occurred"
        );
        assert_eq!(bad_request.operation_types[0].clients, vec![NO_CLIENT]);
    }

    #[test]
    fn test_equal_counts_keep_first_seen_order() {
        let codes = ErrorCodeTable::builtin();
        let groups = aggregate(&sample(), &codes);
        assert_eq!(groups[1].response_code, 401);
        assert_eq!(groups[2].response_code, 404);
    }

    #[test]
    fn test_unknown_code_still_grouped() {
        let codes = ErrorCodeTable::builtin();
        let rows = vec![row("400", "999", "UnknownOperation", r#"{"message": "Unknown error"}"#, "")];
        let groups = aggregate(&rows, &codes);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].error_code, 999);
        assert_eq!(groups[0].name, "Unknown error code");
        assert_eq!(groups[0].description, "Unknown error code");
    }

    #[test]
    fn test_filters_and_skips() {
        let codes = ErrorCodeTable::builtin();
        let rows = vec![
            row("200", "0", "GetMessage", "", ""),
            row("500", "-1", "GetMessage", "", ""),
            row("400", "abc", "GetMessage", "", ""),
            row("400", "4", "", "", ""),
            row("oops", "4", "GetMessage", "", ""),
            row("499", "17", "SendMessage", "plain text", "stream-go-client-6.10.0"),
        ];

        let mut accumulator = GroupAccumulator::new(&codes);
        for (i, r) in rows.iter().enumerate() {
            accumulator.observe(i, r);
        }
        let (groups, skips) = accumulator.finish();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].response_code, 499);
        assert_eq!(groups[0].operation_types[0].example_message, "plain text");
        assert_eq!(skips.missing_fields, 1);
        assert_eq!(skips.invalid_response, 1);
        assert_eq!(skips.invalid_error_code, 1);
    }

    #[test]
    fn test_incomplete_non_client_rows_are_not_skips() {
        let codes = ErrorCodeTable::builtin();
        let rows = vec![
            row("200", "", "GetMessage", "", ""),
            row("503", "", "", "", ""),
            row("", "4", "UpdateUsers", "", ""),
            row("429", "", "SendMessage", "", ""),
        ];

        let mut accumulator = GroupAccumulator::new(&codes);
        for (i, r) in rows.iter().enumerate() {
            accumulator.observe(i, r);
        }
        let (groups, skips) = accumulator.finish();

        assert!(groups.is_empty());
        assert_eq!(skips.missing_fields, 1);
        assert_eq!(skips.total(), 1);
    }

    #[test]
    fn test_error_code_keys_are_numeric() {
        let codes = ErrorCodeTable::builtin();
        let rows = vec![
            row("400", "4", "UpdateUsers", "a", ""),
            row("400", "04", "UpdateUsers", "b", ""),
        ];
        let groups = aggregate(&rows, &codes);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_operations_sorted_and_clients_deduplicated() {
        let codes = ErrorCodeTable::builtin();
        let rows = vec![
            row("403", "17", "SendMessage", "first", "zeta-client"),
            row("403", "17", "DeleteMessage", "x", "alpha-client"),
            row("403", "17", "DeleteMessage", "y", "alpha-client"),
            row("403", "17", "SendMessage", "second", "beta-client"),
            row("403", "17", "SendMessage", "third", "beta-client"),
        ];
        let groups = aggregate(&rows, &codes);
        let ops = &groups[0].operation_types;

        assert_eq!(groups[0].count, 5);
        assert_eq!(groups[0].operation_total(), 5);
        assert_eq!(ops[0].operation_type, "SendMessage");
        assert_eq!(ops[0].count, 3);
        assert_eq!(ops[0].example_message, "first");
        assert_eq!(ops[0].clients, vec!["beta-client", "zeta-client"]);
        assert_eq!(ops[1].operation_type, "DeleteMessage");
        assert_eq!(ops[1].clients, vec!["alpha-client"]);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let codes = ErrorCodeTable::builtin();
        let mut rows = sample();
        rows.push(row("400", "4", "UpdateUsers", "late", "stream-java-client-1.29.0"));
        rows.push(row("401", "5", "Connect", "c", "ios"));

        let sequential = aggregate(&rows, &codes);

        let mut left = GroupAccumulator::new(&codes);
        let mut right = GroupAccumulator::new(&codes);
        for (i, r) in rows.iter().enumerate() {
            if i % 2 == 0 {
                left.observe(i, r);
            } else {
                right.observe(i, r);
            }
        }
        // merge order must not matter
        let (merged, _) = right.merge(left).finish();

        assert_eq!(merged, sequential);
    }

    #[test]
    fn test_empty_input() {
        let codes = ErrorCodeTable::builtin();
        assert!(aggregate(&Vec::new(), &codes).is_empty());
    }
}
