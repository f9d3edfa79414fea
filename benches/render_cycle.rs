use agrimeet_table::data::filter::FilterControls;
use agrimeet_table::{
    ColumnRef, ColumnType, ControlAction, DataColumn, DataTable, EngineOptions, PageAction,
    TableEngine,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn create_test_data(rows: usize) -> DataTable {
    let mut table = DataTable::new("bench");

    table.add_column(DataColumn::new("product")).unwrap();
    table.add_column(DataColumn::new("status")).unwrap();
    table
        .add_column(DataColumn::new("listed").with_type(ColumnType::Date))
        .unwrap();
    table
        .add_column(DataColumn::new("price").with_type(ColumnType::Currency))
        .unwrap();

    let products = [
        "Maize seed",
        "Fertilizer",
        "Tractor hire",
        "Irrigation kit",
        "Hoe",
        "Sorghum",
        "Cassava cuttings",
        "Dairy feed",
    ];
    let statuses = ["Active", "Draft", "Sold", "Published"];

    for i in 0..rows {
        table
            .add_row(vec![
                format!("{} {}", products[i % products.len()], i),
                statuses[i % statuses.len()].to_string(),
                format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                format!("${}.{:02}", (i * 37) % 5000, i % 100),
            ])
            .unwrap();
    }

    table
}

fn options() -> EngineOptions {
    EngineOptions {
        rows_per_page: 25,
        filters: FilterControls {
            search: true,
            selects: vec!["status".to_string()],
            date_column: Some("listed".to_string()),
        },
        ..EngineOptions::default()
    }
}

fn benchmark_render(c: &mut Criterion) {
    let table_1k = Arc::new(create_test_data(1_000));
    let table_10k = Arc::new(create_test_data(10_000));

    let mut group = c.benchmark_group("render");

    group.bench_function("1k_rows_unfiltered", |b| {
        let engine = TableEngine::new(Arc::clone(&table_1k), options()).unwrap();
        b.iter(|| black_box(engine.render()));
    });

    group.bench_function("10k_rows_unfiltered", |b| {
        let engine = TableEngine::new(Arc::clone(&table_10k), options()).unwrap();
        b.iter(|| black_box(engine.render()));
    });

    group.finish();
}

fn benchmark_sort(c: &mut Criterion) {
    let table_10k = Arc::new(create_test_data(10_000));

    let mut group = c.benchmark_group("sort_click");

    for (name, column) in [("currency", 3), ("date", 2), ("text", 0)] {
        group.bench_function(name, |b| {
            let mut engine = TableEngine::new(Arc::clone(&table_10k), options()).unwrap();
            b.iter(|| black_box(engine.dispatch(ControlAction::Sort(ColumnRef::Index(column)))));
        });
    }

    group.finish();
}

fn benchmark_filter_cycle(c: &mut Criterion) {
    let table_10k = Arc::new(create_test_data(10_000));

    c.bench_function("search_select_page_10k", |b| {
        let mut engine = TableEngine::new(Arc::clone(&table_10k), options()).unwrap();
        engine.dispatch(ControlAction::Sort(ColumnRef::Index(3)));
        b.iter(|| {
            engine.dispatch(ControlAction::Search("seed".to_string()));
            engine.dispatch(ControlAction::Select {
                column: "status".to_string(),
                value: "Active".to_string(),
            });
            black_box(engine.dispatch(ControlAction::Page(PageAction::Next)));
            engine.dispatch(ControlAction::Reset);
        });
    });
}

criterion_group!(
    benches,
    benchmark_render,
    benchmark_sort,
    benchmark_filter_cycle
);
criterion_main!(benches);
