//! Menu tree navigation tests
//!
//! Cursor movement, the open chain, cascading retraction and surface
//! lifetimes, observed through a recording display surface.

mod common;

use animenu::menu::{BrowseSpec, ItemType, MenuItem, MenuPath, MenuTree};
use common::{command_menu, nested_menu, touch, RecordingFactory, SurfaceEvent};
use tempfile::TempDir;

fn bound(mut menu: MenuTree, factory: &RecordingFactory) -> MenuTree {
    let mut surfaces = factory.clone();
    menu.bind_surfaces(&mut surfaces, None).unwrap();
    menu
}

/// Open `Settings` in [`nested_menu`].
fn open_settings(root: &mut MenuTree, factory: &RecordingFactory) {
    root.next();
    root.next();
    let mut surfaces = factory.clone();
    assert!(root.select_current(&mut surfaces).unwrap());
}

#[test]
fn test_next_from_hidden_walks_items_in_order() {
    let factory = RecordingFactory::new();
    let mut root = bound(command_menu(&["A", "B", "C"]), &factory);
    let id = factory.log.surface_for("A").unwrap();

    assert_eq!(root.next(), Some(0));
    assert_eq!(root.next(), Some(1));
    assert_eq!(root.next(), Some(2));

    assert_eq!(factory.log.selections(id), vec![Some(0), Some(1), Some(2)]);
    assert_eq!(factory.log.reveals(id), 1);
}

#[test]
fn test_stepping_past_the_ends_selects_nothing() {
    let factory = RecordingFactory::new();
    let mut root = bound(command_menu(&["A", "B"]), &factory);
    let id = factory.log.surface_for("A").unwrap();

    root.next();
    root.next();
    assert_eq!(root.next(), None);
    assert_eq!(root.prev(), Some(1));
    assert_eq!(root.prev(), Some(0));
    assert_eq!(root.prev(), None);

    assert_eq!(factory.log.selections(id).last(), Some(&None));
}

#[test]
fn test_show_current_reports_same_index_twice() {
    let factory = RecordingFactory::new();
    let mut root = bound(command_menu(&["A", "B"]), &factory);
    let id = factory.log.surface_for("A").unwrap();
    root.next();
    root.next();
    factory.log.clear();

    assert_eq!(root.show_current(), Some(1));
    assert_eq!(root.show_current(), Some(1));
    assert_eq!(factory.log.selections(id), vec![Some(1), Some(1)]);
    assert_eq!(factory.log.reveals(id), 0);
}

#[test]
fn test_navigation_moves_deepest_open_menu_only() {
    let factory = RecordingFactory::new();
    let mut root = bound(nested_menu(), &factory);
    open_settings(&mut root, &factory);

    assert_eq!(root.open_chain(), MenuPath::root().child(1));
    assert_eq!(root.next(), Some(1));

    assert_eq!(root.current_index(), Some(1));
    let settings = root.descend(&root.open_chain()).unwrap();
    assert_eq!(settings.current_index(), Some(1));
}

#[test]
fn test_hide_retracts_open_chain_in_lockstep() {
    let factory = RecordingFactory::new();
    let mut root = bound(nested_menu(), &factory);
    open_settings(&mut root, &factory);
    let root_id = factory.log.surface_for("Radio").unwrap();
    let settings_id = factory.log.surface_for("Audio").unwrap();
    factory.log.clear();

    root.hide();

    let frames: Vec<(usize, u32)> = factory
        .log
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SurfaceEvent::HideFrame { id, frame } => Some((id, frame)),
            _ => None,
        })
        .collect();
    assert_eq!(frames.len(), 100);
    assert_eq!(
        &frames[..4],
        &[(settings_id, 0), (root_id, 0), (settings_id, 40), (root_id, 40)]
    );

    assert!(!root.is_visible());
    assert_eq!(root.current_index(), None);
    let settings = root.item(1).and_then(MenuItem::nested).unwrap();
    assert!(!settings.is_visible());
    assert_eq!(settings.current_index(), None);
}

#[test]
fn test_show_toggles_deepest_open_menu() {
    let factory = RecordingFactory::new();
    let mut root = bound(nested_menu(), &factory);
    open_settings(&mut root, &factory);
    let settings_id = factory.log.surface_for("Audio").unwrap();

    root.show();

    assert!(root.is_visible());
    assert_eq!(root.current_index(), Some(1));
    assert!(root.open_chain().is_root());
    assert_eq!(factory.log.retractions(settings_id), 1);
}

#[test]
fn test_hide_then_show_leaves_nothing_selected() {
    let factory = RecordingFactory::new();
    let mut root = bound(command_menu(&["A", "B"]), &factory);
    root.next();

    root.hide();
    root.show();

    assert!(root.is_visible());
    assert_eq!(root.current_index(), None);
}

#[test]
fn test_dropping_tree_disposes_every_surface() {
    let factory = RecordingFactory::new();
    let mut root = bound(nested_menu(), &factory);
    open_settings(&mut root, &factory);
    assert_eq!(factory.log.created(), 2);

    drop(root);

    assert_eq!(factory.log.disposed(), 2);
    assert!(factory
        .log
        .events()
        .iter()
        .any(|event| matches!(event, SurfaceEvent::Hide { .. })));
}

#[test]
fn test_surface_failure_drops_only_that_submenu() {
    let factory = RecordingFactory::failing_on("Video");
    let root = bound(nested_menu(), &factory);

    assert_eq!(root.len(), 2);
    assert_eq!(root.dump(), "[Radio], [run Radio]\n[Shutdown], [poweroff]\n");
    assert_eq!(factory.log.created(), 1);
}

#[test]
fn test_root_surface_failure_is_reported() {
    let factory = RecordingFactory::failing_on("Radio");
    let mut surfaces = factory.clone();
    let mut root = nested_menu();

    assert!(root.bind_surfaces(&mut surfaces, None).is_err());
}

#[test]
fn test_child_panel_is_placed_beside_parent() {
    let factory = RecordingFactory::new();
    let root = bound(nested_menu(), &factory);

    let parent = root.geometry().unwrap();
    let child = root.item(1).and_then(MenuItem::nested).unwrap().geometry().unwrap();
    assert_eq!(child.left, parent.right());
    assert_eq!(child.top, parent.top + 1);
}

fn music_menu(dir: &std::path::Path) -> MenuTree {
    let mut root = command_menu(&["Radio"]);
    let spec = BrowseSpec::new(".*\\.mp3$", "play", false).rooted_at(dir);
    root.push(MenuItem::browse("Music", spec));
    root
}

#[test]
fn test_reselecting_browse_disposes_previous_content() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "a.mp3");
    let factory = RecordingFactory::new();
    let mut surfaces = factory.clone();
    let mut root = bound(music_menu(temp_dir.path()), &factory);

    root.next();
    root.next();
    assert!(root.select_current(&mut surfaces).unwrap());
    assert_eq!(factory.log.created(), 2);
    assert_eq!(root.open_chain(), MenuPath::root().child(1));

    root.hide();
    root.next();
    root.next();
    assert!(root.select_current(&mut surfaces).unwrap());

    assert_eq!(factory.log.created(), 3);
    assert_eq!(factory.log.disposed(), 1);
    let music = root.descend(&root.open_chain()).unwrap();
    assert!(music.is_visible());
    assert_eq!(music.current_index(), Some(0));

    drop(root);
    assert_eq!(factory.log.disposed(), 3);
}

#[test]
fn test_failed_browse_leaves_menu_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let factory = RecordingFactory::new();
    let mut surfaces = factory.clone();
    let mut root = bound(music_menu(&temp_dir.path().join("gone")), &factory);
    root.next();
    root.next();

    assert!(root.select_current(&mut surfaces).is_err());

    assert!(root.item(1).and_then(MenuItem::nested).is_none());
    assert!(root.open_chain().is_root());
    assert_eq!(root.current_index(), Some(1));
    assert_eq!(factory.log.created(), 1);
}

#[test]
fn test_browse_subdirectory_opens_below_its_parent() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("album")).unwrap();
    touch(&temp_dir.path().join("album"), "track.mp3");
    let factory = RecordingFactory::new();
    let mut surfaces = factory.clone();
    let mut root = bound(music_menu(temp_dir.path()), &factory);

    root.next();
    root.next();
    root.select_current(&mut surfaces).unwrap();
    let music_path = root.open_chain();
    let music = root.descend_mut(&music_path).unwrap();
    assert_eq!(music.current_item().map(MenuItem::item_type), Some(ItemType::Browse));
    assert!(music.select_current(&mut surfaces).unwrap());

    let album_path = root.open_chain();
    assert_eq!(album_path, music_path.child(0));
    let album = root.descend(&album_path).unwrap();
    let titles: Vec<&str> = album.items().iter().map(MenuItem::title).collect();
    assert_eq!(titles, vec!["| play all |", "track.mp3"]);
    assert_eq!(
        album.geometry().unwrap().left,
        root.descend(&music_path).unwrap().geometry().unwrap().right()
    );
}
