use crate::models::{GeneratedStory, Illustration, Scene, SceneDraft};

pub const FALLBACK_TITLE: &str = "A Magical Story";

/// Pairs drafts with their illustrations by position.
pub fn assemble(drafts: &[SceneDraft], illustrations: Vec<Illustration>) -> GeneratedStory {
    debug_assert_eq!(drafts.len(), illustrations.len());

    let scenes = drafts
        .iter()
        .zip(illustrations)
        .enumerate()
        .map(|(index, (draft, illustration))| Scene {
            id: index as u32 + 1,
            text: draft.narrative_text.clone(),
            image_url: illustration.image.to_url(),
            image_prompt: illustration.illustration_description,
            title: illustration.title,
        })
        .collect();

    GeneratedStory {
        scenes,
        title: derive_title(drafts),
    }
}

/// "The {first word of scene 1's title} Adventure", or the generic title
/// when scene 1 has no title.
pub fn derive_title(drafts: &[SceneDraft]) -> String {
    drafts
        .first()
        .and_then(|draft| draft.title.split_whitespace().next())
        .map(|word| format!("The {} Adventure", word))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImagePayload, ImageReference};

    fn draft(title: &str, n: usize) -> SceneDraft {
        SceneDraft {
            title: title.to_string(),
            narrative_text: format!("Text {}", n),
            illustration_description: format!("Picture {}", n),
        }
    }

    #[test]
    fn test_title_from_first_word() {
        let drafts = vec![draft("Mayura's Dance", 1), draft("Rain", 2)];
        assert_eq!(derive_title(&drafts), "The Mayura's Adventure");
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(derive_title(&[]), "A Magical Story");
        assert_eq!(derive_title(&[draft("", 1)]), "A Magical Story");
        assert_eq!(derive_title(&[draft("   ", 1)]), "A Magical Story");
        assert_eq!(derive_title(&[draft("  Leading space", 1)]), "The Leading Adventure");
    }

    #[test]
    fn test_pairs_by_index() {
        let drafts: Vec<_> = (1..=4).map(|n| draft(&format!("Title {}", n), n)).collect();
        let illustrations: Vec<_> = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| Illustration {
                image: if i == 2 {
                    ImageReference::Fallback("https://example.com/fallback.jpg".into())
                } else {
                    ImageReference::Generated(ImagePayload::new(format!("QU{}=", i), "image/webp"))
                },
                illustration_description: d.illustration_description.clone(),
                title: d.title.clone(),
            })
            .collect();

        let story = assemble(&drafts, illustrations);
        assert_eq!(story.title, "The Title Adventure");
        assert_eq!(story.scenes.len(), 4);
        for (i, scene) in story.scenes.iter().enumerate() {
            assert_eq!(scene.id, i as u32 + 1);
            assert_eq!(scene.text, drafts[i].narrative_text);
            assert_eq!(scene.image_prompt, drafts[i].illustration_description);
            assert_eq!(scene.title, drafts[i].title);
        }
        assert_eq!(story.scenes[0].image_url, "data:image/webp;base64,QU0=");
        assert_eq!(story.scenes[2].image_url, "https://example.com/fallback.jpg");
    }
}
