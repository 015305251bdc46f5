use std::sync::Arc;

use rusty_parcats::chart::{ChartStyle, BASELINE, HIGHLIGHT};
use rusty_parcats::data::loader::{load_table, DataSource};
use rusty_parcats::error::{DashError, SelectionError};
use rusty_parcats::selection::{InteractionEvent, SelectionState};
use rusty_parcats::state::Session;

use crate::helpers::{csv_file, serve_once, FIVE_CARS};

fn five_car_session() -> Session {
    let file = csv_file(FIVE_CARS);
    let style = ChartStyle::default();
    let table = load_table(&DataSource::Path(file.path().to_path_buf()), &style.columns)
        .expect("fixture loads");
    Session::new(Arc::new(table), style)
}

#[test]
fn initial_render_is_idle() {
    let session = five_car_session();
    let fig = session.figure();

    assert_eq!(session.state(), SelectionState::Idle);
    assert!(!fig.scatter.has_selection());
    assert_eq!(fig.parcats.line.color, vec![BASELINE; 5]);
    // The unknown horsepower keeps its slot.
    assert_eq!(fig.scatter.x[3], None);
    assert_eq!(fig.scatter.y[3], Some(29.0));
}

#[test]
fn lasso_click_and_out_of_range_scenario() {
    let mut session = five_car_session();

    let fig = session
        .handle(&InteractionEvent::LassoSelect { row_indices: vec![1, 3] })
        .expect("valid lasso");
    assert_eq!(fig.scatter.selected_indices(), vec![1, 3]);
    assert_eq!(
        fig.parcats.line.color,
        vec![BASELINE, HIGHLIGHT, BASELINE, HIGHLIGHT, BASELINE]
    );
    for i in [0, 2, 4] {
        assert_eq!(fig.scatter.point_style(i).opacity, 0.4);
    }
    assert_eq!(fig.scatter.point_style(1).color, "firebrick");

    let fig = session
        .handle(&InteractionEvent::Click { row_indices: vec![2] })
        .expect("valid click");
    assert_eq!(fig.consistent_selection(), Some(vec![2]));

    let err = session
        .handle(&InteractionEvent::Click { row_indices: vec![99] })
        .unwrap_err();
    assert_eq!(err, SelectionError::InvalidSelection { index: 99, len: 5 });
    assert_eq!(session.selection().to_vec(), vec![2]);
    assert_eq!(session.figure().consistent_selection(), Some(vec![2]));
}

#[test]
fn category_click_selects_whole_category() {
    let mut session = five_car_session();
    let rows = session.figure().parcats.category_rows(0, "sedan");
    assert_eq!(rows, vec![1, 2, 3]);

    let fig = session
        .handle(&InteractionEvent::Click { row_indices: rows })
        .expect("valid click");
    assert_eq!(fig.parcats.highlighted_indices(), vec![1, 2, 3]);
}

#[test]
fn selecting_everything_and_then_nothing() {
    let mut session = five_car_session();

    session
        .handle(&InteractionEvent::LassoSelect { row_indices: (0..5).collect() })
        .expect("all rows");
    assert_eq!(session.state(), SelectionState::Active);
    assert_eq!(session.figure().parcats.line.color, vec![HIGHLIGHT; 5]);

    session
        .handle(&InteractionEvent::LassoSelect { row_indices: vec![] })
        .expect("deselect");
    assert_eq!(session.state(), SelectionState::Idle);
    assert!(!session.figure().scatter.has_selection());
}

#[test]
fn dataset_over_http_loads() {
    let (addr, server) = serve_once(FIVE_CARS);
    let source = DataSource::parse(&format!("http://{addr}/imports-85.csv"));

    let table = load_table(&source, &ChartStyle::default().columns).expect("url loads");
    server.join().expect("fixture server");

    assert_eq!(table.len(), 5);
    assert_eq!(table.distinct_values("fuel-type"), vec!["diesel", "gas"]);
}

#[test]
fn unreachable_url_is_data_unavailable() {
    // Nothing listens on port 9 (discard) locally.
    let source = DataSource::parse("http://127.0.0.1:9/imports-85.csv");
    let err = load_table(&source, &ChartStyle::default().columns).unwrap_err();
    assert!(matches!(err, DashError::DataUnavailable { .. }));
}
