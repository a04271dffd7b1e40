use crate::common::error::AppError;

// Filtro SQL comum: registros cancelados nunca aparecem no calendário nem nas análises.
// status NULL conta como 'new'.
pub(crate) const ACTIVE_BOOKING_FILTER: &str =
    "lower(coalesce(status, 'new')) NOT IN ('canceled', 'cancelled')";

// ---
// Contrato de "exatamente uma linha"
// ---
/// Toda mutação direcionada pede a linha afetada de volta (RETURNING).
/// Zero ou mais de uma linha é erro de aplicação; como os repositórios chamam
/// isto antes do commit, a transação é desfeita ao sair do escopo.
pub(crate) fn expect_single_row<T>(
    mut rows: Vec<T>,
    action: &'static str,
    table: &'static str,
) -> Result<T, AppError> {
    if rows.len() != 1 {
        return Err(AppError::RowCountMismatch {
            action,
            table,
            affected: rows.len(),
        });
    }
    // len == 1 garantido acima
    rows.pop().ok_or(AppError::RowCountMismatch {
        action,
        table,
        affected: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_row_is_returned() {
        let row = expect_single_row(vec![42], "updated", "bookings").unwrap();
        assert_eq!(row, 42);
    }

    #[test]
    fn zero_rows_is_an_error() {
        let err = expect_single_row(Vec::<i32>::new(), "deleted", "bookings").unwrap_err();
        assert!(matches!(
            err,
            AppError::RowCountMismatch { action: "deleted", table: "bookings", affected: 0 }
        ));
    }

    #[test]
    fn more_than_one_row_is_an_error() {
        let err = expect_single_row(vec![1, 2], "updated", "cupons").unwrap_err();
        assert!(matches!(err, AppError::RowCountMismatch { affected: 2, .. }));
    }
}
