use std::path::Path;
use std::time::Duration;

use banner_sync_core::contract::{MockPlatform, Stylesheet, TextAreaWidget, WikiPage};
use banner_sync_core::error::SyncError;
use banner_sync_core::resources::ResourceLayout;
use banner_sync_core::sidebar::SidebarError;
use banner_sync_core::synchronise::{run_upload, BannerSettings};
use banner_sync_core::upload::upload_images;
use mockall::Sequence;
use tempfile::{tempdir, TempDir};

fn settings() -> BannerSettings {
    BannerSettings {
        upload_delay: Duration::ZERO,
        ..BannerSettings::default()
    }
}

fn featured_widget() -> TextAreaWidget {
    TextAreaWidget {
        id: "widget_1".to_string(),
        short_name: "Featured Posts".to_string(),
        text: "old text".to_string(),
        styles: None,
    }
}

/// Resource directory with the featured posts file and two banner images.
fn resources() -> (TempDir, ResourceLayout) {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());
    std::fs::write(layout.featured_posts_path(), "- Post A\n- Post B\n").unwrap();
    std::fs::write(tmp.path().join("header-img-banner.png"), b"png").unwrap();
    std::fs::write(tmp.path().join("header-img-second.jpg"), b"jpg").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), b"ignored").unwrap();
    (tmp, layout)
}

#[tokio::test]
async fn test_upload_pushes_widget_sidebar_and_images_in_order() {
    let (_tmp, layout) = resources();
    let mut seq = Sequence::new();
    let mut platform = MockPlatform::new();

    platform
        .expect_sidebar_widgets()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(vec![featured_widget()]));
    platform
        .expect_update_widget_text()
        .withf(|widget: &TextAreaWidget, text: &str| {
            widget.id == "widget_1" && text == "- Post A\n- Post B\n"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    platform
        .expect_wiki_page()
        .withf(|page: &str| page == "config/sidebar")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|page: &str| {
            Ok(WikiPage {
                name: page.to_string(),
                content_md: "# Featured Posts\nold line\n# Announcements\nnews\n".to_string(),
            })
        });
    platform
        .expect_edit_wiki_page()
        .withf(|page: &str, content: &str, _reason: &str| {
            page == "config/sidebar"
                && content
                    == "# Featured Posts\n\n- Post A\n- Post B\n\n\n\n# Announcements\nnews\n"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    platform
        .expect_upload_stylesheet_image()
        .withf(|name: &str, path: &Path| {
            name == "header-img-banner" && path.ends_with("header-img-banner.png")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    platform
        .expect_upload_stylesheet_image()
        .withf(|name: &str, path: &Path| {
            name == "header-img-second" && path.ends_with("header-img-second.jpg")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    platform
        .expect_stylesheet()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| {
            Ok(Stylesheet {
                images: vec![],
                stylesheet: ".header { color: red }".to_string(),
            })
        });
    platform
        .expect_update_stylesheet()
        .withf(|css: &str| css == ".header { color: red }")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let report = run_upload(&platform, &layout, &settings())
        .await
        .expect("Upload should succeed");

    assert_eq!(report.images, vec!["header-img-banner", "header-img-second"]);
    assert_eq!(report.widget, "Featured Posts");
    assert_eq!(report.wiki_page, "config/sidebar");
}

#[tokio::test]
async fn test_upload_stops_before_sidebar_edit_when_markers_are_missing() {
    let (_tmp, layout) = resources();
    let mut platform = MockPlatform::new();

    platform
        .expect_sidebar_widgets()
        .returning(|| Ok(vec![featured_widget()]));
    platform
        .expect_update_widget_text()
        .times(1)
        .returning(|_, _| Ok(()));
    platform.expect_wiki_page().returning(|page: &str| {
        Ok(WikiPage {
            name: page.to_string(),
            content_md: "# Featured Posts\nno end marker\n".to_string(),
        })
    });
    platform.expect_edit_wiki_page().never();
    platform.expect_upload_stylesheet_image().never();
    platform.expect_update_stylesheet().never();

    let err = run_upload(&platform, &layout, &settings())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Sidebar(SidebarError::MissingEndMarker(_))
    ));
}

#[tokio::test]
async fn test_upload_fails_without_featured_posts_file() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());
    let mut platform = MockPlatform::new();
    platform.expect_sidebar_widgets().never();
    platform.expect_update_widget_text().never();

    let err = run_upload(&platform, &layout, &settings())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Io(_)));
}

#[tokio::test]
async fn test_upload_images_checks_every_file_before_first_upload() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());
    std::fs::write(tmp.path().join("header-img-a.png"), b"png").unwrap();
    // Editor backup that sorts after the valid image.
    std::fs::write(tmp.path().join("header-img-b.png~"), b"png").unwrap();

    let mut platform = MockPlatform::new();
    platform.expect_upload_stylesheet_image().never();
    platform.expect_stylesheet().never();
    platform.expect_update_stylesheet().never();

    let err = upload_images(&platform, &layout, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::UnsupportedImage(ref p) if p.ends_with("header-img-b.png~")));
}

#[tokio::test]
async fn test_upload_makes_no_remote_write_when_an_image_is_unsupported() {
    let (tmp, layout) = resources();
    std::fs::write(tmp.path().join("header-img-zz.gif"), b"gif").unwrap();

    let mut platform = MockPlatform::new();
    platform.expect_sidebar_widgets().never();
    platform.expect_update_widget_text().never();
    platform.expect_wiki_page().never();
    platform.expect_edit_wiki_page().never();
    platform.expect_upload_stylesheet_image().never();
    platform.expect_update_stylesheet().never();

    let err = run_upload(&platform, &layout, &settings())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::UnsupportedImage(ref p) if p.ends_with("header-img-zz.gif")));
}

#[tokio::test]
async fn test_upload_rejects_two_files_for_one_image_name() {
    let (tmp, layout) = resources();
    std::fs::write(tmp.path().join("header-img-banner.jpg"), b"jpg").unwrap();

    let mut platform = MockPlatform::new();
    platform.expect_update_widget_text().never();
    platform.expect_upload_stylesheet_image().never();

    let err = run_upload(&platform, &layout, &settings())
        .await
        .unwrap_err();

    match err {
        SyncError::DuplicateImage { name, paths } => {
            assert_eq!(name, "header-img-banner");
            assert_eq!(paths.len(), 2);
        }
        other => panic!("expected duplicate image error, got {other}"),
    }
}

#[tokio::test]
async fn test_upload_images_waits_after_each_upload() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());
    for name in ["header-img-1.png", "header-img-2.png", "header-img-3.png"] {
        std::fs::write(tmp.path().join(name), b"png").unwrap();
    }

    let mut seq = Sequence::new();
    let mut platform = MockPlatform::new();
    platform
        .expect_upload_stylesheet_image()
        .times(3)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    platform
        .expect_stylesheet()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Stylesheet::default()));
    platform
        .expect_update_stylesheet()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let delay = Duration::from_millis(20);
    let started = std::time::Instant::now();
    let uploaded = upload_images(&platform, &layout, delay).await.unwrap();

    assert_eq!(uploaded.len(), 3);
    // One pause per upload, the last one before the stylesheet save.
    assert!(started.elapsed() >= delay * 3);
}
