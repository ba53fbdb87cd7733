use crate::{db::table::TableHandle, error::InternalError};

///
/// OutputTable
///
/// Where a scan's result lives. An aliased output is the source table
/// itself, handed downstream untouched; only an owned output may be
/// written by the scan.
///

#[derive(Clone, Debug)]
pub enum OutputTable {
    Aliased(TableHandle),
    Owned(TableHandle),
}

impl OutputTable {
    #[must_use]
    pub const fn handle(&self) -> &TableHandle {
        match self {
            Self::Aliased(handle) | Self::Owned(handle) => handle,
        }
    }

    /// Writable handle; an aliased output can never be written.
    pub fn owned(&self) -> Result<&TableHandle, InternalError> {
        match self {
            Self::Owned(handle) => Ok(handle),
            Self::Aliased(_) => Err(InternalError::executor_invariant(
                "attempted to write into an output table that aliases the scan source",
            )),
        }
    }

    #[must_use]
    pub const fn is_aliased(&self) -> bool {
        matches!(self, Self::Aliased(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{schema::TupleSchema, table::Table};
    use std::rc::Rc;

    fn handle() -> TableHandle {
        TableHandle::new(Table::new("t", Rc::new(TupleSchema::default())))
    }

    #[test]
    fn aliased_output_refuses_writes() {
        let source = handle();
        let output = OutputTable::Aliased(source.clone());

        assert!(output.is_aliased());
        assert!(output.handle().ptr_eq(&source));
        assert!(output.owned().expect_err("aliased").is_configuration_defect());
    }

    #[test]
    fn owned_output_is_writable() {
        let output = OutputTable::Owned(handle());

        assert!(!output.is_aliased());
        assert!(output.owned().is_ok());
    }
}
