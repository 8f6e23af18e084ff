mod common;

use common::{column, rows, table};
use proptest::prelude::*;
use tablekit::{
    Column, OperationKind, ScalarType, Table, convert::convert, history::HISTORY_LIMIT,
    infer::infer,
};

#[test]
fn inference_examples() {
    assert_eq!(infer(&["1", "2", "3", "4"]), ScalarType::Integer);
    assert_eq!(infer(&["1", "2.5", "3"]), ScalarType::Double);
    assert_eq!(infer(&["true", "false", "TRUE"]), ScalarType::Boolean);
    assert_eq!(
        infer(&["red", "blue", "red", "green", "blue", "red", "blue", "red", "green", "blue", "red"]),
        ScalarType::Categorical
    );
    let letters = ('a'..='u').map(|c| c.to_string()).collect::<Vec<_>>();
    assert_eq!(infer(&letters), ScalarType::String);
    assert_eq!(infer(&["", ""]), ScalarType::String);
}

#[test]
fn conversion_is_total() {
    assert_eq!(convert("abc", ScalarType::String, ScalarType::Integer), "0");
    assert_eq!(convert("abc", ScalarType::String, ScalarType::Double), "0.0");
    assert_eq!(convert("1", ScalarType::String, ScalarType::Boolean), "true");
    assert_eq!(convert("yes", ScalarType::String, ScalarType::Boolean), "false");
    assert_eq!(convert("3.9", ScalarType::Double, ScalarType::Integer), "3");
    assert_eq!(convert("true", ScalarType::Boolean, ScalarType::Double), "1.0");
    assert_eq!(convert("", ScalarType::String, ScalarType::Integer), "0");
    assert_eq!(convert("x", ScalarType::Integer, ScalarType::Categorical), "x");
}

#[test]
fn sorting_applies_one_permutation_to_all_columns() {
    let mut pairs = table(
        "pairs",
        vec![
            column("letter", ScalarType::String, &["b", "a", "b"]),
            column("number", ScalarType::Integer, &["2", "1", "1"]),
        ],
    );
    pairs.sort("letter", true);
    assert_eq!(
        rows(&pairs),
        vec![vec!["a", "1"], vec!["b", "2"], vec!["b", "1"]]
    );
    pairs.sort("number", true);
    assert_eq!(
        rows(&pairs),
        vec![vec!["a", "1"], vec!["b", "1"], vec!["b", "2"]]
    );
}

#[test]
fn statistics_of_named_column() {
    let scores = table(
        "scores",
        vec![column("score", ScalarType::Integer, &["3", "1", "4", "1", "5", ""])],
    );
    let stats = scores.statistics("score").expect("column exists");
    assert_eq!(stats.null_count, 1);
    assert_eq!(stats.unique_count, 4);
    assert_eq!(stats.mean, Some(2.8));
    assert_eq!(stats.median, Some(3.0));
    assert_eq!(stats.mode.as_deref(), Some("1"));
    assert_eq!(stats.quartiles, Some((1.0, 3.0, 4.0)));
    assert_eq!(stats.min.as_deref(), Some("1"));
    assert_eq!(stats.max.as_deref(), Some("5"));
    assert!(scores.statistics("missing").is_none());
}

#[test]
fn history_keeps_latest_hundred_operations() {
    let mut log = table("log", vec![column("v", ScalarType::Integer, &[])]);
    for idx in 0..150 {
        log.insert_row(idx, None);
    }
    assert_eq!(log.row_count(), 150);
    assert_eq!(log.history().len(), HISTORY_LIMIT);
    let first = log.history().first().expect("history is not empty");
    assert_eq!(first.description, "Inserted row at 50");
    assert_eq!(
        log.history().last().map(|op| op.description.as_str()),
        Some("Inserted row at 149")
    );
}

#[test]
fn invalid_positions_leave_table_unchanged() {
    let mut grid = table(
        "grid",
        vec![column("a", ScalarType::String, &["x", "y"])],
    );
    let before = grid.clone();
    grid.remove_column(3);
    grid.remove_row(9);
    grid.set_value("z", 5, 0);
    grid.set_value("z", 0, 5);
    grid.sort("missing", true);
    grid.rename_column(2, "b");
    grid.change_column_type(4, ScalarType::Integer);
    assert_eq!(grid, before);
    assert!(grid.history().is_empty());
}

#[test]
fn change_column_type_rewrites_cells() {
    let mut prices = table(
        "prices",
        vec![column("p", ScalarType::String, &["1.5", "n/a", ""])],
    );
    prices.change_column_type(0, ScalarType::Double);
    let retyped = prices.column("p").expect("column exists");
    assert_eq!(retyped.data_type, ScalarType::Double);
    assert_eq!(retyped.values, vec!["1.5", "0.0", "0.0"]);
    assert_eq!(
        prices.history().last().map(|op| op.kind),
        Some(OperationKind::TypeChange)
    );
}

#[test]
fn metadata_tracks_shape_and_size() {
    let mut sized = table("sized", vec![column("ab", ScalarType::String, &["xyz"])]);
    assert_eq!(sized.metadata.memory_usage, 5);
    sized.add_column(Column::from_strs("n", ScalarType::Integer, &["7", "8"]));
    assert_eq!(sized.metadata.column_count, 2);
    assert_eq!(sized.metadata.row_count, 1);
    assert_eq!(sized.column("n").expect("added").values, vec!["7"]);
    assert!(sized.metadata.last_modified >= sized.metadata.created);
}

#[test]
fn serialized_round_trip_is_lossless() {
    let mut t = table(
        "orders",
        vec![
            column("id", ScalarType::Integer, &["1", "2"]),
            column("when", ScalarType::Date, &["2024-01-01", "2024-02-01"]),
            column("tag", ScalarType::Categorical, &["a", "a"]),
        ],
    );
    t.add_row(Some(&["3".to_string()][..]));
    t.metadata.notes = Some("nightly".into());
    let restored = Table::from_json(&t.to_json().expect("serialize")).expect("deserialize");
    assert_eq!(restored, t);
}

#[derive(Debug, Clone)]
enum Mutation {
    AddColumn(usize, ScalarType),
    InsertColumn(usize, usize),
    RemoveColumn(usize),
    AddRow(Vec<String>),
    InsertRow(usize),
    RemoveRow(usize),
    SetValue(usize, usize, String),
    Sort(usize, bool),
    ChangeType(usize, ScalarType),
}

fn scalar_type() -> impl Strategy<Value = ScalarType> {
    prop_oneof![
        Just(ScalarType::String),
        Just(ScalarType::Integer),
        Just(ScalarType::Double),
        Just(ScalarType::Boolean),
        Just(ScalarType::Categorical),
    ]
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0usize..6, scalar_type()).prop_map(|(len, ty)| Mutation::AddColumn(len, ty)),
        (0usize..6, 0usize..6).prop_map(|(len, at)| Mutation::InsertColumn(len, at)),
        (0usize..5).prop_map(Mutation::RemoveColumn),
        proptest::collection::vec("[a-z0-9]{0,3}", 0..5).prop_map(Mutation::AddRow),
        (0usize..8).prop_map(Mutation::InsertRow),
        (0usize..8).prop_map(Mutation::RemoveRow),
        (0usize..8, 0usize..5, "[a-z0-9]{0,3}").prop_map(|(r, c, v)| Mutation::SetValue(r, c, v)),
        (0usize..5, any::<bool>()).prop_map(|(c, asc)| Mutation::Sort(c, asc)),
        (0usize..5, scalar_type()).prop_map(|(c, ty)| Mutation::ChangeType(c, ty)),
    ]
}

fn apply(t: &mut Table, mutation: Mutation) {
    match mutation {
        Mutation::AddColumn(len, ty) => {
            let values = (0..len).map(|i| i.to_string()).collect();
            t.add_column(Column::new(format!("c{}", t.column_count()), ty, values));
        }
        Mutation::InsertColumn(len, at) => {
            let values = vec!["v".to_string(); len];
            t.insert_column(Column::new("inserted", ScalarType::String, values), at);
        }
        Mutation::RemoveColumn(at) => t.remove_column(at),
        Mutation::AddRow(values) => t.add_row(Some(values.as_slice())),
        Mutation::InsertRow(at) => t.insert_row(at, None),
        Mutation::RemoveRow(at) => t.remove_row(at),
        Mutation::SetValue(row, col, value) => t.set_value(value, row, col),
        Mutation::Sort(col, ascending) => {
            let name = t.column_at(col).map(|c| c.name.clone()).unwrap_or_default();
            t.sort(&name, ascending);
        }
        Mutation::ChangeType(col, ty) => t.change_column_type(col, ty),
    }
}

proptest! {
    #[test]
    fn every_column_matches_row_count(mutations in proptest::collection::vec(mutation(), 0..40)) {
        let mut t = Table::new("prop");
        for mutation in mutations {
            apply(&mut t, mutation);
            let expected = t.row_count();
            prop_assert!(t.columns().iter().all(|c| c.len() == expected));
            prop_assert_eq!(t.metadata.row_count, expected);
            prop_assert_eq!(t.metadata.column_count, t.column_count());
            prop_assert!(t.history().len() <= HISTORY_LIMIT);
        }
    }

    #[test]
    fn json_round_trip_reproduces_table(
        cells in proptest::collection::vec(proptest::collection::vec("[ -~]{0,6}", 3), 0..12)
    ) {
        let headers = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let t = Table::from_records("prop", &headers, &cells, Some("memory"));
        let restored = Table::from_json(&t.to_json().unwrap()).unwrap();
        prop_assert_eq!(restored, t);
    }
}
