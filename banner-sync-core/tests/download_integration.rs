use banner_sync_core::contract::{MockPlatform, Stylesheet, StylesheetImage, TextAreaWidget};
use banner_sync_core::error::SyncError;
use banner_sync_core::resources::ResourceLayout;
use banner_sync_core::synchronise::{run_download, BannerSettings};
use banner_sync_core::widget::WidgetError;
use tempfile::tempdir;

fn image(name: &str, url: &str) -> StylesheetImage {
    StylesheetImage {
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn featured_widget(text: &str) -> TextAreaWidget {
    TextAreaWidget {
        id: "widget_1".to_string(),
        short_name: "Featured Posts".to_string(),
        text: text.to_string(),
        styles: None,
    }
}

#[tokio::test]
async fn test_download_writes_banner_images_and_featured_posts() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path().join("resources"));

    let mut platform = MockPlatform::new();
    platform.expect_stylesheet().times(1).returning(|| {
        Ok(Stylesheet {
            images: vec![
                image("header-img-banner", "https://img.example/abc.png"),
                image("snoo", "https://img.example/snoo.png"),
                image("header-img-second", "https://img.example/def.jpg"),
            ],
            stylesheet: ".side {}".to_string(),
        })
    });
    platform
        .expect_fetch_image()
        .times(2)
        .returning(|url: &str| Ok(url.as_bytes().to_vec()));
    platform
        .expect_sidebar_widgets()
        .times(1)
        .returning(|| Ok(vec![featured_widget("- Post A\n- Post B\n")]));

    let report = run_download(&platform, &layout, &BannerSettings::default())
        .await
        .expect("Download should succeed");

    assert_eq!(report.images.len(), 2);
    let banner = layout.dir.join("header-img-banner.png");
    assert!(report.images.contains(&banner));
    assert_eq!(
        std::fs::read(&banner).unwrap(),
        b"https://img.example/abc.png".to_vec()
    );
    assert!(layout.dir.join("header-img-second.jpg").is_file());
    assert!(!layout.dir.join("snoo.png").exists());

    assert_eq!(report.featured_posts, layout.featured_posts_path());
    assert_eq!(
        std::fs::read_to_string(layout.featured_posts_path()).unwrap(),
        "- Post A\n- Post B\n"
    );
}

#[tokio::test]
async fn test_download_into_existing_directory_overwrites_files() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());
    std::fs::write(layout.featured_posts_path(), "stale").unwrap();

    let mut platform = MockPlatform::new();
    platform
        .expect_stylesheet()
        .returning(|| Ok(Stylesheet::default()));
    platform.expect_fetch_image().never();
    platform
        .expect_sidebar_widgets()
        .returning(|| Ok(vec![featured_widget("fresh")]));

    let report = run_download(&platform, &layout, &BannerSettings::default())
        .await
        .expect("Download should succeed when the directory exists");

    assert!(report.images.is_empty());
    assert_eq!(
        std::fs::read_to_string(layout.featured_posts_path()).unwrap(),
        "fresh"
    );
}

#[tokio::test]
async fn test_download_fails_when_widget_is_missing() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());

    let mut platform = MockPlatform::new();
    platform
        .expect_stylesheet()
        .returning(|| Ok(Stylesheet::default()));
    platform.expect_sidebar_widgets().returning(|| Ok(vec![]));

    let err = run_download(&platform, &layout, &BannerSettings::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Widget(WidgetError::NotFound(ref name)) if name == "Featured Posts"
    ));
    assert!(!layout.featured_posts_path().exists());
}

#[tokio::test]
async fn test_download_aborts_on_image_fetch_error() {
    let tmp = tempdir().unwrap();
    let layout = ResourceLayout::new(tmp.path());

    let mut platform = MockPlatform::new();
    platform.expect_stylesheet().returning(|| {
        Ok(Stylesheet {
            images: vec![
                image("header-img-1", "https://img.example/1.png"),
                image("header-img-2", "https://img.example/2.png"),
            ],
            stylesheet: String::new(),
        })
    });
    platform.expect_fetch_image().times(2).returning(|url: &str| {
        if url.ends_with("2.png") {
            Err("connection reset".into())
        } else {
            Ok(vec![1, 2, 3])
        }
    });
    platform.expect_sidebar_widgets().never();

    let err = run_download(&platform, &layout, &BannerSettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Platform(_)));
    // The image fetched before the failure stays on disk.
    assert!(tmp.path().join("header-img-1.png").is_file());
    assert!(!tmp.path().join("header-img-2.png").exists());
}
