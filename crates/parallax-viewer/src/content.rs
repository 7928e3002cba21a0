//! Static annotation content for the default scene: anchors on the subject
//! surface, popup offsets, bubble tints, and fact text.

use crate::annotate::{Annotation, AnnotationSpec};
use glam::Vec2;

/// The default scene's annotations. The last entry is linked to the title
/// highlight: it has no bubble of its own and surfaces whenever the
/// highlighted word is hovered.
pub fn default_annotations() -> Vec<Annotation> {
    [
        AnnotationSpec {
            anchor: Vec2::new(0.2, 0.33),
            popup_offset: Vec2::new(-140.0, -160.0),
            text: "The Leonard P. Zakim Bunker Hill Memorial Bridge carries ten lanes of I-93 \
                   and U.S. Route 1 across the Charles River.",
            source: "https://www.mass.gov/info-details/the-big-dig-tunnels-and-bridges",
            color: [59, 130, 246],
            linked_to_highlight: false,
        },
        AnnotationSpec {
            anchor: Vec2::new(0.39, 0.59),
            popup_offset: Vec2::new(-140.0, -180.0),
            text: "The bridge is 1,432 feet long, with a 745-foot main span and a deck width \
                   of 183 feet, making it the widest cable-stayed bridge at the time of \
                   completion.",
            source: "https://www.mass.gov/info-details/the-big-dig-tunnels-and-bridges",
            color: [234, 88, 12],
            linked_to_highlight: false,
        },
        AnnotationSpec {
            anchor: Vec2::new(0.6, 0.72),
            popup_offset: Vec2::new(-140.0, -160.0),
            text: "Fourteen elephants crossed the bridge on October 14, 2002, to demonstrate \
                   its structural strength prior to opening.",
            source: "https://www.sec.state.ma.us/mus/pdfs/tourbrochure.pdf",
            color: [34, 197, 94],
            linked_to_highlight: false,
        },
        AnnotationSpec {
            anchor: Vec2::new(0.79, 0.28),
            popup_offset: Vec2::new(-140.0, -160.0),
            text: "The bridge is named for civil rights leader Leonard P. Zakim and \
                   commemorates the Battle of Bunker Hill.",
            source: "https://www.mass.gov/info-details/the-big-dig-tunnels-and-bridges",
            color: [168, 85, 247],
            linked_to_highlight: true,
        },
    ]
    .into_iter()
    .map(Annotation::new)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_linked_annotation() {
        let annotations = default_annotations();
        let linked = annotations
            .iter()
            .filter(|a| a.spec.linked_to_highlight)
            .count();
        assert_eq!(linked, 1);
    }

    #[test]
    fn anchors_are_normalized() {
        for a in default_annotations() {
            assert!((0.0..=1.0).contains(&a.spec.anchor.x));
            assert!((0.0..=1.0).contains(&a.spec.anchor.y));
        }
    }
}
