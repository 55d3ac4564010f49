use folio::prelude::*;

field_enum! {
    enum TicketField {
        Status => "status",
        Assignee => "assignee.name",
    }
}

#[test]
fn typed_paging_config_through_facade() {
    let config = FolioConfig::from_yaml_str("folio:\n  paging:\n    size: 15\n", "test")
        .unwrap()
        .with_typed::<PagingConfig>()
        .unwrap();
    assert_eq!(config.size, 15);
    assert_eq!(config.margin, 2);
    assert_eq!(config.max_size, None);
}

#[test]
fn typed_fields_build_specifications() {
    let spec = Specification::new()
        .and((TicketField::Status, ["open", "blocked"]))
        .and(Predicate::is_null(TicketField::Assignee));
    assert!(spec.requires_join());
    assert_eq!(spec.render(), "status in ('open','blocked') AND assignee.name is null");
}

#[test]
fn paged_select_through_facade() {
    let spec = Specification::new().and((TicketField::Status, "open"));
    let pageable = Pageable::of(2, 25);
    let select = SelectQuery::new("tickets")
        .dialect(Dialect::Postgres)
        .filter(&spec)
        .pageable(&pageable)
        .build_paged_select()
        .unwrap();
    assert_eq!(
        select.sql,
        "SELECT * FROM tickets WHERE status = $1 LIMIT 25 OFFSET 25"
    );
}
