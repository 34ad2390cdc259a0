use std::sync::Arc;

use error_stack::Report;
use tracing::{info, instrument, warn};

use crate::domain::{
    records::{ordinal_value, Record, RecordFields},
    sheets::{
        layout::{ChildSheet, ParentSheet},
        table::{cell_at, KeyMatcher},
    },
    SheetsCredentials,
};
use crate::ports::{
    record_service::{RecordService, RecordServiceError, UpdateOutcome},
    row_store::{RowStore, RowStoreError},
};

/// Record access for licitações (parent sheet) and their itens (child sheet).
pub struct LicitacaoService {
    row_store: Arc<dyn RowStore>,
    parent: ParentSheet,
    child: ChildSheet,
    keep_omitted_fields: bool,
}

impl std::fmt::Debug for LicitacaoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicitacaoService")
            .field("parent", &self.parent.sheet.name)
            .field("child", &self.child.sheet.name)
            .field("keep_omitted_fields", &self.keep_omitted_fields)
            .finish()
    }
}

fn upstream(report: Report<RowStoreError>) -> Report<RecordServiceError> {
    let message = report.current_context().upstream_message().to_owned();
    report.change_context(RecordServiceError::Upstream { message })
}

fn require_identifier(name: &str, value: &str) -> Result<(), RecordServiceError> {
    if value.is_empty() {
        return Err(RecordServiceError::validation(format!(
            "{} must not be empty",
            name
        )));
    }
    Ok(())
}

impl LicitacaoService {
    pub fn new(row_store: Arc<dyn RowStore>, parent: ParentSheet, child: ChildSheet) -> Self {
        Self {
            row_store,
            parent,
            child,
            keep_omitted_fields: false,
        }
    }

    /// Keep the stored value of fields an update leaves out instead of blanking them.
    pub fn keep_omitted_fields(mut self, keep: bool) -> Self {
        self.keep_omitted_fields = keep;
        self
    }
}

#[async_trait::async_trait]
impl RecordService for LicitacaoService {
    #[instrument(skip(self, credentials))]
    async fn list_parents(
        &self,
        credentials: &SheetsCredentials,
    ) -> error_stack::Result<Vec<Record>, RecordServiceError> {
        let records = self
            .row_store
            .fetch_rows(credentials, &self.parent.sheet)
            .await
            .map_err(upstream)?;
        info!(count = records.len(), "Listed licitações");
        Ok(records)
    }

    #[instrument(skip(self, credentials))]
    async fn list_children(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
    ) -> error_stack::Result<Vec<Record>, RecordServiceError> {
        require_identifier("unique_id", parent_key)?;

        let table = self
            .row_store
            .fetch_table(credentials, &self.child.sheet)
            .await
            .map_err(upstream)?;

        let mut children: Vec<(i64, Record)> = table
            .rows_matching(&KeyMatcher::new(self.child.parent_key, parent_key))
            .into_iter()
            .map(|cells| {
                let ordinal = ordinal_value(cell_at(cells, self.child.ordinal));
                (ordinal, table.record(cells))
            })
            .collect();
        // Stable, so equal ordinals keep their storage order.
        children.sort_by_key(|(ordinal, _)| *ordinal);

        info!(count = children.len(), "Listed itens");
        Ok(children.into_iter().map(|(_, record)| record).collect())
    }

    #[instrument(skip(self, credentials, fields), fields(fields = fields.len()))]
    async fn update_parent(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
        fields: &RecordFields,
    ) -> error_stack::Result<UpdateOutcome, RecordServiceError> {
        require_identifier("unique_id", parent_key)?;

        let sheet = &self.parent.sheet;
        let table = self
            .row_store
            .fetch_table(credentials, sheet)
            .await
            .map_err(upstream)?;

        let Some(row) = table.locate_row(&KeyMatcher::new(self.parent.key, parent_key)) else {
            warn!("Licitação not found");
            return Ok(UpdateOutcome::NotFound);
        };

        self.row_store
            .overwrite_row(credentials, sheet, &table, row, fields, self.keep_omitted_fields)
            .await
            .map_err(upstream)?;

        info!(%row, "Licitação updated");
        Ok(UpdateOutcome::Updated { row })
    }

    #[instrument(skip(self, credentials, fields), fields(fields = fields.len()))]
    async fn update_child(
        &self,
        credentials: &SheetsCredentials,
        parent_key: &str,
        ordinal: &str,
        fields: &RecordFields,
    ) -> error_stack::Result<UpdateOutcome, RecordServiceError> {
        require_identifier("unique_id", parent_key)?;
        require_identifier("item_numero", ordinal)?;

        let sheet = &self.child.sheet;
        let table = self
            .row_store
            .fetch_table(credentials, sheet)
            .await
            .map_err(upstream)?;

        let matcher = KeyMatcher::new(self.child.ordinal, ordinal)
            .and(self.child.parent_key, parent_key);
        let Some(row) = table.locate_row(&matcher) else {
            warn!("Item not found");
            return Ok(UpdateOutcome::NotFound);
        };

        self.row_store
            .overwrite_row(credentials, sheet, &table, row, fields, self.keep_omitted_fields)
            .await
            .map_err(upstream)?;

        info!(%row, "Item updated");
        Ok(UpdateOutcome::Updated { row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::in_memory_row_store::InMemoryRowStore;
    use crate::domain::sheets::{column::parse_col, row::Row, sheet_range::SheetRange};

    fn credentials() -> SheetsCredentials {
        SheetsCredentials::new("k", "s")
    }

    fn lines(lines: &[&[&str]]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn parent_sheet() -> ParentSheet {
        ParentSheet::new(
            SheetRange::new("licitacoes", "A:C".parse().unwrap()),
            parse_col("A").unwrap(),
        )
        .unwrap()
    }

    fn child_sheet() -> ChildSheet {
        ChildSheet::new(
            SheetRange::new("itens_licitacao", "A:C".parse().unwrap()),
            parse_col("C").unwrap(),
            parse_col("A").unwrap(),
        )
        .unwrap()
    }

    fn service(store: &Arc<InMemoryRowStore>) -> LicitacaoService {
        LicitacaoService::new(store.clone(), parent_sheet(), child_sheet())
    }

    fn seeded_store() -> Arc<InMemoryRowStore> {
        let store = InMemoryRowStore::new();
        store.insert_sheet(
            "licitacoes",
            lines(&[
                &["unique_id", "licitacao_objeto", "arquivo_pdf"],
                &["L1", "Canetas", "l1.pdf"],
                &["L2", "Papel"],
            ]),
        );
        store.insert_sheet(
            "itens_licitacao",
            lines(&[
                &["item_numero", "item_descricao", "unique_id"],
                &["10", "Dez", "ABC"],
                &["007", "Sete", "OTHER"],
                &["x", "Sem numero", "ABC"],
                &["2", "Dois", "ABC"],
                &["007", "Sete", "ABC"],
            ]),
        );
        Arc::new(store)
    }

    fn ordinals(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .map(|record| record.get("item_numero").unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_list_parents_in_storage_order() {
        let store = seeded_store();
        let parents = service(&store).list_parents(&credentials()).await.unwrap();
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0].get("unique_id"), Some("L1"));
        assert_eq!(parents[1].get("arquivo_pdf"), Some(""));
    }

    #[tokio::test]
    async fn test_list_parents_of_header_only_sheet_is_empty() {
        let store = InMemoryRowStore::new();
        store.insert_sheet("licitacoes", lines(&[&["unique_id"]]));
        let store = Arc::new(store);
        let parents = service(&store).list_parents(&credentials()).await.unwrap();
        assert!(parents.is_empty());
    }

    #[tokio::test]
    async fn test_list_children_filters_and_sorts_numerically() {
        let store = seeded_store();
        let children = service(&store)
            .list_children(&credentials(), "ABC")
            .await
            .unwrap();
        assert_eq!(ordinals(&children), vec!["x", "2", "007", "10"]);
        assert!(children
            .iter()
            .all(|record| record.get("unique_id") == Some("ABC")));
    }

    #[tokio::test]
    async fn test_list_children_sorts_by_leading_integer() {
        let store = InMemoryRowStore::new();
        store.insert_sheet(
            "itens_licitacao",
            lines(&[
                &["item_numero", "item_descricao", "unique_id"],
                &["2", "Dois", "ABC"],
                &["1.1", "Um ponto um", "ABC"],
                &["1", "Um", "ABC"],
                &["3a", "Tres a", "ABC"],
            ]),
        );
        let store = Arc::new(store);
        let children = service(&store)
            .list_children(&credentials(), "ABC")
            .await
            .unwrap();
        assert_eq!(ordinals(&children), vec!["1.1", "1", "2", "3a"]);
    }

    #[tokio::test]
    async fn test_list_children_without_match_is_empty() {
        let store = seeded_store();
        let children = service(&store)
            .list_children(&credentials(), "NOPE")
            .await
            .unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_list_children_rejects_empty_key() {
        let store = seeded_store();
        let error = service(&store)
            .list_children(&credentials(), "")
            .await
            .unwrap_err();
        assert!(matches!(
            error.current_context(),
            RecordServiceError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_parent_overwrites_whole_row() {
        let store = seeded_store();
        let fields: RecordFields = [("unique_id", "L2"), ("licitacao_objeto", "Papel A4")]
            .into_iter()
            .collect();
        let outcome = service(&store)
            .update_parent(&credentials(), "L2", &fields)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { row: Row::from_row(3) });

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].range, "'licitacoes'!A3:C3");
        assert_eq!(
            writes[0].rows,
            lines(&[&["L2", "Papel A4", ""]])
        );
    }

    #[tokio::test]
    async fn test_update_parent_blanks_omitted_fields() {
        let store = seeded_store();
        let fields: RecordFields = [("licitacao_objeto", "Canetas azuis")].into_iter().collect();
        service(&store)
            .update_parent(&credentials(), "L1", &fields)
            .await
            .unwrap();

        let parents = service(&store).list_parents(&credentials()).await.unwrap();
        assert_eq!(parents[0].get("unique_id"), Some(""));
        assert_eq!(parents[0].get("licitacao_objeto"), Some("Canetas azuis"));
        assert_eq!(parents[0].get("arquivo_pdf"), Some(""));
    }

    #[tokio::test]
    async fn test_update_parent_can_keep_omitted_fields() {
        let store = seeded_store();
        let fields: RecordFields = [("licitacao_objeto", "Canetas azuis")].into_iter().collect();
        service(&store)
            .keep_omitted_fields(true)
            .update_parent(&credentials(), "L1", &fields)
            .await
            .unwrap();

        let parents = service(&store).list_parents(&credentials()).await.unwrap();
        assert_eq!(parents[0].get("unique_id"), Some("L1"));
        assert_eq!(parents[0].get("arquivo_pdf"), Some("l1.pdf"));
    }

    #[tokio::test]
    async fn test_update_missing_parent_does_not_write() {
        let store = seeded_store();
        let fields: RecordFields = [("licitacao_objeto", "?")].into_iter().collect();
        let outcome = service(&store)
            .update_parent(&credentials(), "L9", &fields)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_update_child_touches_only_its_parent_row() {
        let store = seeded_store();
        let fields: RecordFields = [
            ("item_numero", "007"),
            ("item_descricao", "Sete unidades"),
            ("unique_id", "ABC"),
        ]
        .into_iter()
        .collect();
        let outcome = service(&store)
            .update_child(&credentials(), "ABC", "007", &fields)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { row: Row::from_row(6) });

        let other = service(&store)
            .list_children(&credentials(), "OTHER")
            .await
            .unwrap();
        assert_eq!(other[0].get("item_descricao"), Some("Sete"));

        let mine = service(&store)
            .list_children(&credentials(), "ABC")
            .await
            .unwrap();
        assert_eq!(mine[2].get("item_descricao"), Some("Sete unidades"));
    }

    #[tokio::test]
    async fn test_update_child_compares_ordinal_as_text() {
        let store = seeded_store();
        let fields: RecordFields = [("item_descricao", "?")].into_iter().collect();
        let outcome = service(&store)
            .update_child(&credentials(), "ABC", "7", &fields)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_message() {
        let store = seeded_store();
        store.fail_with("API key not valid");
        let error = service(&store).list_parents(&credentials()).await.unwrap_err();
        assert_eq!(
            error.current_context(),
            &RecordServiceError::Upstream {
                message: "API key not valid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_never_writes() {
        let store = seeded_store();
        store.fail_with("unreachable");
        let fields: RecordFields = [("licitacao_objeto", "?")].into_iter().collect();
        let result = service(&store)
            .update_parent(&credentials(), "L1", &fields)
            .await;
        assert!(result.is_err());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_after_locate_is_upstream() {
        let store = seeded_store();
        store.fail_writes_with("The caller does not have permission");
        let fields: RecordFields = [("unique_id", "L1")].into_iter().collect();
        let error = service(&store)
            .update_parent(&credentials(), "L1", &fields)
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &RecordServiceError::Upstream {
                message: "The caller does not have permission".to_string()
            }
        );
        assert!(store.writes().is_empty());
        assert_eq!(store.sheet("licitacoes").unwrap()[1][1], "Canetas");
    }
}
