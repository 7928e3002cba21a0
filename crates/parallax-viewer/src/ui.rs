//! egui overlay: annotation bubbles and fact popups, positioned at the
//! pixel coordinates the projector computed this frame.

use crate::annotate::Annotation;
use egui::{Color32, Id, Order, RichText, Rounding, Sense, Stroke};

const BUBBLE_RADIUS: f32 = 11.0;
const POPUP_WIDTH: f32 = 260.0;

/// Draws every bubble and visible popup, updating `hovered`/`pinned` from
/// this frame's pointer input. A click that lands outside every egui area
/// clears all pins, mirroring a click-away dismiss.
pub fn draw_annotations(ctx: &egui::Context, annotations: &mut [Annotation], label_hovered: bool) {
    let clicked_away = ctx.input(|i| i.pointer.any_pressed()) && !ctx.is_pointer_over_area();

    for (i, annotation) in annotations.iter_mut().enumerate() {
        if clicked_away {
            annotation.pinned = false;
        }
        if !annotation.spec.linked_to_highlight {
            draw_bubble(ctx, i, annotation);
        }
    }

    for (i, annotation) in annotations.iter().enumerate() {
        if annotation.visible(label_hovered) {
            draw_popup(ctx, i, annotation);
        }
    }
}

fn draw_bubble(ctx: &egui::Context, index: usize, annotation: &mut Annotation) {
    let center = egui::pos2(annotation.marker_px.x, annotation.marker_px.y);
    let [r, g, b] = annotation.spec.color;
    let fill = Color32::from_rgba_unmultiplied(r, g, b, 204);
    let border = Color32::from_rgba_unmultiplied(
        r.saturating_add(40),
        g.saturating_add(40),
        b.saturating_add(40),
        242,
    );

    egui::Area::new(Id::new(("bubble", index)))
        .order(Order::Foreground)
        .fixed_pos(center - egui::vec2(BUBBLE_RADIUS, BUBBLE_RADIUS))
        .show(ctx, |ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(BUBBLE_RADIUS * 2.0, BUBBLE_RADIUS * 2.0),
                Sense::click(),
            );
            let radius = if response.hovered() {
                BUBBLE_RADIUS + 2.0
            } else {
                BUBBLE_RADIUS
            };
            ui.painter().circle_filled(rect.center(), radius, fill);
            ui.painter()
                .circle_stroke(rect.center(), radius, Stroke::new(1.5, border));

            annotation.hovered = response.hovered();
            if response.clicked() {
                annotation.pinned = !annotation.pinned;
            }
        });
}

fn draw_popup(ctx: &egui::Context, index: usize, annotation: &Annotation) {
    egui::Area::new(Id::new(("popup", index)))
        .order(Order::Foreground)
        .fixed_pos(egui::pos2(annotation.popup_px.x, annotation.popup_px.y))
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_rgba_unmultiplied(15, 18, 30, 235))
                .stroke(Stroke::new(1.0, Color32::from_gray(90)))
                .rounding(Rounding::same(8.0))
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.set_max_width(POPUP_WIDTH);
                    ui.label(RichText::new(annotation.spec.text).color(Color32::from_gray(230)));
                    if !annotation.spec.source.is_empty() {
                        ui.hyperlink(annotation.spec.source);
                    }
                });
        });
}
