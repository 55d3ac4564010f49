use std::sync::Mutex;
use std::time::{Duration, Instant};

use folio_core::{ConfigProperties, FolioConfig};
use folio_data::prelude::*;
use folio_data::{BoundFragment, IdentifierPolicy, PagingConfig, SqlConfig};

#[derive(Debug, Clone, PartialEq)]
struct Artist {
    id: i64,
    name: String,
}

impl Entity for Artist {
    fn table_name() -> &'static str {
        "artists"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "name", "agency_id", "created_at"]
    }

    fn field_columns() -> &'static [(&'static str, &'static str)] {
        &[
            ("id", "id"),
            ("name", "name"),
            ("createdAt", "created_at"),
            ("agency.name", "name"),
        ]
    }
}

/// Stand-in for a database driver: records every statement and serves
/// rows from memory according to LIMIT/OFFSET.
struct RecordingExecutor {
    rows: Vec<Artist>,
    sql: SqlConfig,
    statements: Mutex<Vec<BoundFragment>>,
}

impl RecordingExecutor {
    fn new(count: i64, sql: SqlConfig) -> Self {
        Self {
            rows: (1..=count)
                .map(|id| Artist {
                    id,
                    name: format!("artist-{id}"),
                })
                .collect(),
            sql,
            statements: Mutex::new(Vec::new()),
        }
    }

    fn query<'a>(&self, map: &'a ColumnMap, filter: &'a Specification) -> SelectQuery<'a> {
        SelectQuery::for_entity::<Artist>()
            .dialect(self.sql.dialect)
            .identifier_policy(self.sql.identifiers)
            .mapper(map)
            .join("agency", "LEFT JOIN agencies agency ON agency.id = artists.agency_id")
            .filter(filter)
    }

    fn statements(&self) -> Vec<BoundFragment> {
        self.statements.lock().unwrap().clone()
    }
}

impl SpecificationExecutor<Artist> for RecordingExecutor {
    async fn find_page(
        &self,
        filter: &Specification,
        pageable: &Pageable,
    ) -> Result<PageResult<Artist>, DataError> {
        let started = Instant::now();
        let map = Artist::column_map();
        let select = self.query(&map, filter).pageable(pageable).build_paged_select()?;
        self.statements.lock().unwrap().push(select);

        let total = self.count(filter).await?;
        let window = pageable.to_limit();
        let rows = self
            .rows
            .iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResult::new(rows, Some(total), Some(pageable.clone())).with_elapsed(started.elapsed()))
    }

    async fn count(&self, filter: &Specification) -> Result<u64, DataError> {
        let map = Artist::column_map();
        let count = self.query(&map, filter).build_count()?;
        self.statements.lock().unwrap().push(count);
        Ok(self.rows.len() as u64)
    }
}

#[tokio::test]
async fn find_page_builds_select_and_count() {
    let executor = RecordingExecutor::new(47, SqlConfig {
        dialect: Dialect::Postgres,
        ..SqlConfig::default()
    });
    let filter = Specification::new()
        .and(("name", ["artist-1", "artist-2"]))
        .or(Specification::new().and(("agency.name", "Acme")));
    let pageable = Pageable::of(3, 10).with_sort(SortCollection::new().desc("createdAt"));

    let page = executor.find_page(&filter, &pageable).await.unwrap();

    assert_eq!(page.total_results(), 47);
    assert_eq!(page.total_pages(), 5);
    assert_eq!(page.rows().len(), 10);
    assert_eq!(page.rows()[0].id, 21);
    assert_eq!(page.window().iter().map(|l| l.page).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert!(page.elapsed() < Duration::from_secs(5));

    let statements = executor.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0].sql,
        "SELECT id, name, agency_id, created_at FROM artists \
         LEFT JOIN agencies agency ON agency.id = artists.agency_id \
         WHERE name in ($1,$2) OR (agency.name = $3) \
         ORDER BY created_at desc LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        statements[1].sql,
        "SELECT COUNT(*) FROM artists \
         LEFT JOIN agencies agency ON agency.id = artists.agency_id \
         WHERE name in ($1,$2) OR (agency.name = $3)"
    );
    assert_eq!(statements[0].params, statements[1].params);
    assert_eq!(statements[1].params[2], Value::from("Acme"));
}

#[tokio::test]
async fn unqualified_filter_skips_join() {
    let executor = RecordingExecutor::new(3, SqlConfig::default());
    let filter = Specification::new().and(Predicate::is_not_null("name"));

    let count = executor.count(&filter).await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        executor.statements()[0].sql,
        "SELECT COUNT(*) FROM artists WHERE name is not null"
    );
}

#[tokio::test]
async fn invalid_identifier_surfaces_as_error() {
    let executor = RecordingExecutor::new(3, SqlConfig {
        identifiers: IdentifierPolicy::Validate,
        ..SqlConfig::default()
    });
    let filter = Specification::new().and(("name; --", 1));

    let err = executor.count(&filter).await.unwrap_err();

    assert!(matches!(err, DataError::InvalidIdentifier { kind: "column", .. }));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn request_to_page_with_configured_defaults() {
    let config = FolioConfig::from_yaml_str(
        "folio:\n  paging:\n    size: 5\n    maxsize: 8\n    margin: 1\n  sql:\n    dialect: sqlite\n    identifiers: quote\n",
        "test",
    )
    .unwrap();
    let paging = PagingConfig::from_config(&config).unwrap();
    let sql = SqlConfig::from_config(&config).unwrap();
    let executor = RecordingExecutor::new(30, sql);

    let allowed = ColumnMap::new().with("created", "createdAt");
    let pageable = PageRequest::from_query("page=2&sort=-created").into_pageable(
        &paging,
        &allowed,
        SortCollection::new().asc("id"),
    );
    let page = executor
        .find_page(&Specification::always_true(), &pageable)
        .await
        .unwrap()
        .with_margin(paging.margin);

    assert_eq!(page.page_size(), 5);
    assert_eq!(page.total_pages(), 6);
    assert_eq!(page.window().iter().map(|l| l.page).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(
        executor.statements()[0].sql,
        "SELECT \"id\", \"name\", \"agency_id\", \"created_at\" FROM \"artists\" \
         WHERE 1=1 ORDER BY \"created_at\" desc LIMIT 5 OFFSET 5"
    );

    let oversized = PageRequest::from_query("size=50").into_pageable(&paging, &allowed, SortCollection::new());
    assert_eq!(oversized.page_size(), 8);
}
