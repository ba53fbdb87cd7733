use crate::{
    db::{expr::Expression, tuple::Tuple},
    error::InternalError,
};

///
/// CountingPostfilter
///
/// Predicate + offset/limit gate applied to rows after they leave the
/// source and before they are emitted. State is scoped to one execution.
///
/// Ordering contract:
/// - the predicate runs first; a rejected row never touches offset or limit
/// - the first `offset` matching rows are consumed silently
/// - only then do matching rows count toward `limit` and get emitted
///

#[derive(Debug)]
pub struct CountingPostfilter<'p> {
    predicate: Option<&'p dyn Expression>,
    limit: Option<usize>,
    offset_remaining: usize,
    emitted: usize,
    above_limit: bool,
}

impl<'p> CountingPostfilter<'p> {
    /// Limit sentinel: emit every matching row.
    pub const NO_LIMIT: Option<usize> = None;

    /// Offset sentinel: skip nothing.
    pub const NO_OFFSET: usize = 0;

    #[must_use]
    pub const fn new(
        predicate: Option<&'p dyn Expression>,
        limit: Option<usize>,
        offset: usize,
    ) -> Self {
        Self {
            predicate,
            limit,
            offset_remaining: offset,
            emitted: 0,
            above_limit: false,
        }
    }

    /// True while fewer than `limit` rows have been emitted.
    #[must_use]
    pub const fn is_under_limit(&self) -> bool {
        if self.above_limit {
            return false;
        }

        match self.limit {
            Some(limit) => self.emitted < limit,
            None => true,
        }
    }

    /// Evaluate one row; `true` means the row is emitted.
    pub fn eval(&mut self, tuple: &Tuple) -> Result<bool, InternalError> {
        if let Some(predicate) = self.predicate
            && !predicate.eval(tuple)?.is_true()
        {
            return Ok(false);
        }

        if self.offset_remaining > 0 {
            self.offset_remaining -= 1;
            return Ok(false);
        }

        if !self.is_under_limit() {
            return Ok(false);
        }
        self.emitted += 1;

        Ok(true)
    }

    /// Force the gate closed; used when a downstream stage has all the rows
    /// it needs.
    pub const fn set_above_limit(&mut self) {
        self.above_limit = true;
    }

    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::expr::{CompareOp, Expr},
        tuple,
    };
    use proptest::prelude::*;

    fn run(
        ids: &[i64],
        predicate: Option<&Expr>,
        limit: Option<usize>,
        offset: usize,
    ) -> (Vec<i64>, usize) {
        let mut filter =
            CountingPostfilter::new(predicate.map(|p| p as &dyn Expression), limit, offset);
        let mut out = Vec::new();
        let mut visited = 0;
        for id in ids {
            if !filter.is_under_limit() {
                break;
            }
            visited += 1;
            if filter.eval(&tuple![*id]).expect("eval") {
                out.push(*id);
            }
        }

        (out, visited)
    }

    #[test]
    fn offset_is_consumed_before_limit() {
        let predicate = Expr::column_cmp(0, CompareOp::Gte, 4_i64);
        let (out, visited) = run(&[0, 2, 4, 6, 8], Some(&predicate), Some(1), 1);

        assert_eq!(out, vec![6]);
        assert_eq!(visited, 4);
    }

    #[test]
    fn rejected_rows_do_not_consume_offset() {
        let predicate = Expr::column_cmp(0, CompareOp::Gt, 2_i64);
        let (out, _) = run(&[1, 2, 3, 4, 5], Some(&predicate), None, 1);

        assert_eq!(out, vec![4, 5]);
    }

    #[test]
    fn zero_limit_is_never_under_limit() {
        let filter = CountingPostfilter::new(None, Some(0), CountingPostfilter::NO_OFFSET);

        assert!(!filter.is_under_limit());
    }

    #[test]
    fn set_above_limit_closes_an_unlimited_gate() {
        let mut filter = CountingPostfilter::new(
            None,
            CountingPostfilter::NO_LIMIT,
            CountingPostfilter::NO_OFFSET,
        );
        assert!(filter.eval(&tuple![1_i64]).expect("eval"));

        filter.set_above_limit();

        assert!(!filter.is_under_limit());
        assert!(!filter.eval(&tuple![2_i64]).expect("eval"));
        assert_eq!(filter.emitted(), 1);
    }

    #[test]
    fn offset_larger_than_matches_emits_nothing() {
        let (out, visited) = run(&[1, 2, 3], None, Some(5), 10);

        assert!(out.is_empty());
        assert_eq!(visited, 3);
    }

    proptest! {
        #[test]
        fn output_is_the_offset_limit_slice_of_matches(
            ids in proptest::collection::vec(-50_i64..50, 0..40),
            threshold in -50_i64..50,
            limit in proptest::option::of(0_usize..20),
            offset in 0_usize..20,
        ) {
            let predicate = Expr::column_cmp(0, CompareOp::Gte, threshold);
            let (out, visited) = run(&ids, Some(&predicate), limit, offset);

            let matches: Vec<i64> = ids.iter().copied().filter(|id| *id >= threshold).collect();
            let expected: Vec<i64> = matches
                .iter()
                .copied()
                .skip(offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            prop_assert_eq!(&out, &expected);

            // Early termination: the scan stops right after the last emitted row.
            if let Some(limit) = limit
                && expected.len() == limit
            {
                let stop = if limit == 0 {
                    0
                } else {
                    let last_match_index = matches.len().min(offset + limit);
                    ids.iter()
                        .enumerate()
                        .filter(|(_, id)| **id >= threshold)
                        .nth(last_match_index - 1)
                        .map_or(ids.len(), |(i, _)| i + 1)
                };
                prop_assert_eq!(visited, stop);
            } else {
                prop_assert_eq!(visited, ids.len());
            }
        }
    }
}
