use std::{cell::RefCell, rc::Rc};

use leptos::html::Canvas as CanvasNode;
use leptos::{
    create_effect, create_node_ref, create_signal, NodeRef, Signal, SignalGet, SignalSet,
    SignalWith,
};
use leptos_use::{use_device_pixel_ratio, use_element_size, UseElementSizeReturn};
use tracing::error;

use super::canvas::{Chart, ChartCanvas};

pub struct UseChartCanvasReturn {
    pub node_ref: NodeRef<CanvasNode>,
    pub actual_width: Signal<f64>,
    pub actual_height: Signal<f64>,
}

/// Binds a canvas node to a chart: the 2d context is acquired once the node
/// is mounted, then the chart is redrawn on every size, pixel ratio or data
/// change.
pub fn use_chart_canvas(chart: Signal<Chart>) -> UseChartCanvasReturn {
    let node_ref = create_node_ref::<CanvasNode>();
    let dpr = use_device_pixel_ratio();
    let UseElementSizeReturn { width, height } = use_element_size(node_ref);
    let actual_width = move || width.get() * dpr.get();
    let actual_height = move || height.get() * dpr.get();

    let (canvas, set_canvas) = create_signal::<Option<Rc<RefCell<ChartCanvas>>>>(None);

    create_effect(move |_| {
        let Some(node) = node_ref.get() else {
            return;
        };

        match ChartCanvas::try_new(&node) {
            Ok(chart_canvas) => set_canvas.set(Some(Rc::new(RefCell::new(chart_canvas)))),
            Err(err) => error!("chart canvas failed to initialize: {err}"),
        }
    });

    create_effect(move |_| {
        let Some(canvas) = canvas.get() else {
            return;
        };

        let (width, height, dpr) = (width.get(), height.get(), dpr.get());
        chart.with(|chart| canvas.borrow_mut().render(chart, width, height, dpr));
    });

    UseChartCanvasReturn {
        node_ref,
        actual_width: actual_width.into(),
        actual_height: actual_height.into(),
    }
}
