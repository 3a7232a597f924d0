use collager::{
    AspectRatio, CollageEditor, TemplateCatalog,
    core::{Axis, Size},
};

fn editor_with(template_id: &str) -> CollageEditor {
    let mut editor =
        CollageEditor::new(Size::new(400.0, 400.0), AspectRatio::square(), 8.0).unwrap();
    let template = TemplateCatalog::builtin().get(template_id).unwrap().clone();
    editor.set_template(template).unwrap();
    editor
}

fn assert_in_bounds(editor: &CollageEditor) {
    let state = editor.layout_state().unwrap();
    assert!(
        state.axis_span(Axis::Columns) <= state.work_area.width + 1e-3,
        "column span {} exceeds work width {}",
        state.axis_span(Axis::Columns),
        state.work_area.width
    );
    assert!(
        state.axis_span(Axis::Rows) <= state.work_area.height + 1e-3,
        "row span {} exceeds work height {}",
        state.axis_span(Axis::Rows),
        state.work_area.height
    );
}

#[test]
fn work_area_ratio_holds_for_every_template_and_margin() {
    let catalog = TemplateCatalog::builtin();
    for template in catalog.iter() {
        for margin in [0.0, 4.0, 8.0, 15.0, 23.0, 40.0] {
            for ratio in [
                AspectRatio::square(),
                AspectRatio::new(4, 3).unwrap(),
                AspectRatio::new(9, 16).unwrap(),
            ] {
                let mut editor =
                    CollageEditor::new(Size::new(400.0, 400.0), ratio, margin).unwrap();
                editor.set_template(template.clone()).unwrap();
                let work = editor.layout_state().unwrap().work_area;
                assert!(
                    (work.width / work.height - ratio.as_f64()).abs() < 1e-3,
                    "template '{}' margin {margin}: {work:?}",
                    template.id
                );
            }
        }
    }
}

#[test]
fn ratio_sweep_conserves_combined_width() {
    for step in 1..=9 {
        let ratio = f64::from(step) / 10.0;
        let mut editor = editor_with("grid-4");
        let before = editor.layout_state().unwrap().clone();
        let combined = before.column_widths[0] + before.column_widths[1];
        assert!(combined >= 2.0 * collager::MIN_CELL_SIZE);

        assert!(editor.adjust_ratio(0, 1, ratio).unwrap(), "ratio {ratio}");
        let state = editor.layout_state().unwrap();
        let sum = state.column_widths[0] + state.column_widths[1];
        assert!((sum - combined).abs() < 1e-9, "ratio {ratio} lost width");
        assert!(
            (state.column_widths[0] / combined - ratio).abs() < 1e-9,
            "ratio {ratio} split off target"
        );
        assert_in_bounds(&editor);
    }
}

#[test]
fn interleaved_adjustments_and_reconfigures_stay_bounded() {
    let mut editor = editor_with("grid-4");

    editor.adjust_ratio(0, 1, 0.7).unwrap();
    assert_in_bounds(&editor);

    editor.set_inner_margin(20.0).unwrap();
    assert_in_bounds(&editor);

    editor.adjust_ratio(2, 3, 0.3).unwrap();
    assert_in_bounds(&editor);

    editor.set_aspect_ratio(AspectRatio::new(4, 3).unwrap());
    assert_in_bounds(&editor);

    // Row pair on the other axis.
    editor.adjust_ratio(0, 2, 0.65).unwrap();
    assert_in_bounds(&editor);

    editor.set_inner_margin(2.0).unwrap();
    assert_in_bounds(&editor);

    editor.set_aspect_ratio(AspectRatio::new(9, 16).unwrap());
    assert_in_bounds(&editor);
}

#[test]
fn margin_change_keeps_a_70_30_split() {
    let mut editor = editor_with("grid-4");
    assert!(editor.adjust_ratio(0, 1, 0.7).unwrap());

    editor.set_inner_margin(24.0).unwrap();
    let state = editor.layout_state().unwrap();
    let total: f64 = state.column_widths.iter().sum();
    assert!((state.column_widths[0] / total - 0.7).abs() < 1e-2);
    assert!((state.column_widths[1] / total - 0.3).abs() < 1e-2);
    assert_in_bounds(&editor);
}

#[test]
fn grid4_concrete_numbers() {
    let editor = editor_with("grid-4");
    let state = editor.layout_state().unwrap();
    assert_eq!(state.work_area, Size::new(384.0, 384.0));
    assert_eq!(state.outer_margin, 8.0);
    for index in 0..4 {
        let rect = editor.cell_rect(index).unwrap();
        assert!((rect.width() - 188.0).abs() < 1e-9);
        assert!((rect.height() - 188.0).abs() < 1e-9);
    }
}

#[test]
fn drag_sequence_settles_within_bounds() {
    let mut editor = editor_with("grid-4");
    editor.begin_divider_drag(0, 1).unwrap();
    for delta in [10.0, 25.0, 60.0, 45.0] {
        editor.drag_divider_to(delta).unwrap();
    }
    editor.end_divider_drag().unwrap();
    assert_in_bounds(&editor);

    // The final delta maps to 0.5 + 45/(384*0.4) ~= 0.793.
    let state = editor.layout_state().unwrap();
    let total = state.column_widths[0] + state.column_widths[1];
    assert!((state.column_widths[0] / total - 0.793).abs() < 1e-2);
}

#[test]
fn span_template_has_fixed_shape() {
    let editor = editor_with("left-tall");
    assert!(editor.dividers().is_empty());
    let tall = editor.cell_rect(0).unwrap();
    let pair_top = editor.cell_rect(1).unwrap();
    let pair_bottom = editor.cell_rect(2).unwrap();
    assert!((tall.height() - (pair_top.height() + pair_bottom.height() + 8.0)).abs() < 1e-9);
}
