use scopes_core::context::ScopesContext;
use scopes_core::error::ScopesError;
use scopes_core::facade::{
    SceneGraph, SceneNodeId, ScopesFacade, ScopesReader, get_closest_scopes_facade,
};
use scopes_core::store::ScopeEvent;
use scopes_core::types::Scope;

/// app(F_app) ── panel ── row(F_row) ── cell
///           └── sidebar(F_side)
struct Fixture {
    context: ScopesContext,
    scene: SceneGraph,
    app: SceneNodeId,
    panel: SceneNodeId,
    row: SceneNodeId,
    cell: SceneNodeId,
    sidebar: SceneNodeId,
    app_facade: ScopesFacade,
    row_facade: ScopesFacade,
    side_facade: ScopesFacade,
}

fn fixture() -> Fixture {
    let context = ScopesContext::from_catalog([Scope::new("prod", "Production")]);
    let mut scene = SceneGraph::new();
    let app = scene.add_root("app");
    let panel = scene.add_child(app, "panel");
    let row = scene.add_child(panel, "row");
    let cell = scene.add_child(row, "cell");
    let sidebar = scene.add_child(app, "sidebar");

    let app_facade = ScopesFacade::attach(&context, &scene, app, None).unwrap();
    let row_facade = ScopesFacade::attach(&context, &scene, row, None).unwrap();
    let side_facade = ScopesFacade::attach(&context, &scene, sidebar, None).unwrap();

    Fixture {
        context,
        scene,
        app,
        panel,
        row,
        cell,
        sidebar,
        app_facade,
        row_facade,
        side_facade,
    }
}

#[test]
fn attach_without_parent_resolves_enclosing_facade() {
    let f = fixture();

    assert_eq!(f.app_facade.parent(), None);
    assert_eq!(f.row_facade.parent(), Some(f.app_facade.clone()));
    assert_eq!(f.side_facade.parent(), Some(f.app_facade.clone()));
    assert_eq!(
        f.app_facade.children(),
        vec![f.row_facade.id(), f.side_facade.id()]
    );
}

#[test]
fn closest_facade_is_nearest_ancestor() {
    let f = fixture();

    let closest = |node| get_closest_scopes_facade(&f.context, &f.scene, node);
    assert_eq!(closest(f.cell), Some(f.row_facade.clone()));
    assert_eq!(closest(f.row), Some(f.row_facade.clone()));
    assert_eq!(closest(f.panel), Some(f.app_facade.clone()));
    assert_eq!(closest(f.app), Some(f.app_facade.clone()));
    assert_eq!(closest(f.sidebar), Some(f.side_facade.clone()));
}

#[test]
fn closest_facade_never_picks_sibling_or_descendant() {
    let mut f = fixture();
    let footer = f.scene.add_child(f.app, "footer");

    let closest = get_closest_scopes_facade(&f.context, &f.scene, footer).unwrap();

    assert_eq!(closest, f.app_facade);
    assert_ne!(closest, f.side_facade);
    assert_ne!(closest, f.row_facade);
}

#[test]
fn closest_facade_is_none_without_any_facade() {
    let context = ScopesContext::from_catalog([]);
    let mut scene = SceneGraph::new();
    let root = scene.add_root("root");
    let leaf = scene.add_child(root, "leaf");

    assert_eq!(get_closest_scopes_facade(&context, &scene, leaf), None);
}

#[test]
fn closest_facade_skips_destroyed_facades() {
    let f = fixture();

    assert!(f.row_facade.destroy());
    assert_eq!(
        get_closest_scopes_facade(&f.context, &f.scene, f.cell),
        Some(f.app_facade.clone())
    );

    assert!(f.app_facade.destroy());
    assert_eq!(get_closest_scopes_facade(&f.context, &f.scene, f.cell), None);
}

#[test]
fn closest_facade_skips_unmounted_owner() {
    let mut f = fixture();
    let detached = f.scene.add_root("detached");
    let floating = ScopesFacade::attach(&f.context, &f.scene, detached, Some(&f.row_facade)).unwrap();

    f.scene.unmount(f.row);

    assert_eq!(
        get_closest_scopes_facade(&f.context, &f.scene, detached),
        Some(floating.clone())
    );
    f.scene.unmount(detached);
    assert_eq!(
        get_closest_scopes_facade(&f.context, &f.scene, detached),
        Some(f.app_facade.clone())
    );
}

#[test]
fn destroy_leaves_children_rootless() {
    let f = fixture();

    f.app_facade.destroy();

    assert!(f.row_facade.is_alive());
    assert_eq!(f.row_facade.parent(), None);
    assert_eq!(f.side_facade.parent(), None);
    assert_eq!(
        get_closest_scopes_facade(&f.context, &f.scene, f.cell),
        Some(f.row_facade.clone())
    );
    assert_eq!(get_closest_scopes_facade(&f.context, &f.scene, f.panel), None);
}

#[test]
fn destroy_is_idempotent_and_detaches_from_parent() {
    let f = fixture();
    let events = f.context.subscribe();

    assert!(f.row_facade.destroy());
    assert!(!f.row_facade.destroy());

    assert!(!f.row_facade.is_alive());
    assert_eq!(f.app_facade.children(), vec![f.side_facade.id()]);
    let destroyed = events
        .try_iter()
        .filter(|event| matches!(event, ScopeEvent::FacadeDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 1);
}

#[test]
fn second_facade_on_same_node_is_rejected() {
    let f = fixture();

    let result = ScopesFacade::attach(&f.context, &f.scene, f.row, None);

    assert_eq!(
        result,
        Err(ScopesError::FacadeAlreadyAttached(f.row_facade.id()))
    );
}

#[test]
fn node_can_reattach_after_destroy() {
    let f = fixture();
    f.row_facade.destroy();

    let replacement = ScopesFacade::attach(&f.context, &f.scene, f.row, None).unwrap();

    assert_ne!(replacement.id(), f.row_facade.id());
    assert_eq!(replacement.parent(), Some(f.app_facade.clone()));
}

#[test]
fn facades_observe_store_changes_immediately() {
    let f = fixture();

    f.context.select(["prod"]);
    assert_eq!(f.row_facade.selected_scope_names(), vec!["prod"]);
    assert_eq!(f.side_facade.selected_scope_names(), vec!["prod"]);

    f.context.enter_read_only();
    assert!(f.row_facade.is_read_only());
    f.context.exit_read_only().unwrap();
    assert!(!f.app_facade.is_read_only());
}
