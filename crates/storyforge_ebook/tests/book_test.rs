//! Tests for book persistence and image export.

mod test_utils;

use storyforge_core::GeneratedImage;
use storyforge_ebook::{Book, Slot};
use test_utils::{image, sample_book};

#[tokio::test]
async fn test_save_and_load_preserves_book() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("book.json");
    let mut book = sample_book(3);
    book.set_cover(image(9));
    book.set_panel_image(2, image(2))?;
    book.mark_failed(Slot::Panel(3))?;

    book.save(&path).await?;
    let loaded = Book::load(&path).await?;

    assert_eq!(loaded, book);
    assert!(loaded.panel(3).is_some_and(|p| p.failed));
    Ok(())
}

#[tokio::test]
async fn test_load_missing_file_is_error() {
    let dir = tempfile::tempdir().expect("tempdir");

    let result = Book::load(dir.path().join("missing.json")).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_export_writes_cover_then_panels() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("images");
    let mut book = sample_book(3);
    book.set_cover(image(9));
    book.set_panel_image(1, image(1))?;
    book.set_panel_image(3, GeneratedImage::new("image/jpeg", vec![0xff, 0xd8, 3]))?;

    let written = book.export_images(&out).await?;

    let names: Vec<String> = written
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, vec!["cover.png", "panel-01.png", "panel-03.jpg"]);
    assert_eq!(std::fs::read(&written[2])?, vec![0xff, 0xd8, 3]);
    Ok(())
}
