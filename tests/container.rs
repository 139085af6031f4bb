extern crate env_logger;
extern crate rand;
extern crate serde_json;
extern crate spawnable;

use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::json;

use spawnable::errors::Result;
use spawnable::prelude::*;
use spawnable::spawnable::container::release_assets;
use spawnable::uuid::Uuid;

const HERO: TemplateId = 42;

fn mesh_type() -> AssetType {
    AssetType::new(Uuid::from_u128(0x7a2871b9_5eab_4de0_a901_b0d2c6920ddb))
}

fn network_type() -> AssetType {
    AssetType::new(Uuid::from_u128(0x3b0c8c0e_6f2a_4a31_9e22_5d5e3f8ab101))
}

struct RecordingRegistry {
    bridge: AssetRegistryBridge,
    registered: Mutex<Vec<AssetId>>,
    unregistered: Mutex<Vec<AssetId>>,
}

impl RecordingRegistry {
    fn new() -> Self {
        RecordingRegistry {
            bridge: AssetRegistryBridge::new(
                Arc::new(AssetCatalog::new()),
                Arc::new(AssetManager::new()),
            ),
            registered: Mutex::new(Vec::new()),
            unregistered: Mutex::new(Vec::new()),
        }
    }

    fn catalog(&self) -> &AssetCatalog {
        self.bridge.catalog()
    }

    fn manager(&self) -> &AssetManager {
        self.bridge.manager()
    }

    fn registered(&self) -> usize {
        self.registered.lock().unwrap().len()
    }

    fn unregistered(&self) -> usize {
        self.unregistered.lock().unwrap().len()
    }

    fn unregistered_times(&self, id: AssetId) -> usize {
        self.unregistered
            .lock()
            .unwrap()
            .iter()
            .filter(|&&v| v == id)
            .count()
    }
}

impl AssetRegistry for RecordingRegistry {
    fn register_asset(&self, id: AssetId, info: AssetInfo) {
        self.registered.lock().unwrap().push(id);
        self.bridge.register_asset(id, info);
    }

    fn unregister_asset(&self, id: AssetId) {
        self.unregistered.lock().unwrap().push(id);
        self.bridge.unregister_asset(id);
    }

    fn find_or_create_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        self.bridge.find_or_create_asset(id, asset_type, load_behavior)
    }

    fn assign_asset_data(&self, asset: &Asset) {
        self.bridge.assign_asset_data(asset);
    }

    fn get_asset(
        &self,
        id: AssetId,
        asset_type: AssetType,
        load_behavior: AssetLoadBehavior,
    ) -> Asset {
        self.bridge.get_asset(id, asset_type, load_behavior)
    }

    fn block_until_load_complete(&self, asset: &Asset) -> AssetStatus {
        self.bridge.block_until_load_complete(asset)
    }
}

/// Emits a side product `<name>.network` for every prefab.
struct NetworkProductCreator;

impl PrefabProcessor for NetworkProductCreator {
    fn name(&self) -> &str {
        "NetworkProductCreator"
    }

    fn process(&mut self, ctx: &mut PrefabProcessorContext) {
        let names: Vec<String> = ctx.prefabs().iter().map(|(v, _)| v.clone()).collect();
        for name in names {
            let product_id = format!("{}.network", name);
            let id = ctx.product_asset_id(&product_id);
            let asset = Asset::from_payload(id, network_type(), vec![1u8, 2, 3]);
            ctx.add_processed_object(ProcessedObject::new(network_type(), product_id, asset));
        }
    }
}

struct Failing;

impl PrefabProcessor for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn process(&mut self, ctx: &mut PrefabProcessorContext) {
        ctx.error_encountered("failed on purpose");
    }
}

/// Takes the payloads out of every product emitted so far.
struct PayloadStripper;

impl PrefabProcessor for PayloadStripper {
    fn name(&self) -> &str {
        "PayloadStripper"
    }

    fn process(&mut self, ctx: &mut PrefabProcessorContext) {
        for object in ctx.processed_objects_mut().iter_mut() {
            object.release_asset();
        }
    }
}

fn profiles() -> Arc<ProcessorStackProfiles> {
    let mut profiles = ProcessorStackProfiles::with_defaults();
    profiles.register_processor("NetworkProductCreator", || Box::new(NetworkProductCreator));
    profiles.register_processor("Failing", || Box::new(Failing));
    profiles.register_processor("PayloadStripper", || Box::new(PayloadStripper));

    profiles.add_profile(
        "Networked",
        &[
            EditorOnlyEntityRemover::NAME,
            SpawnableProductCreator::NAME,
            "NetworkProductCreator",
        ],
    );
    profiles.add_profile("Rootless", &["NetworkProductCreator"]);
    profiles.add_profile("Empty", &[] as &[&str]);
    profiles.add_profile("Broken", &[SpawnableProductCreator::NAME, "Failing"]);
    profiles.add_profile("Stripped", &[SpawnableProductCreator::NAME, "PayloadStripper"]);
    Arc::new(profiles)
}

fn hero(mesh: Uuid, reference: AssetLoadBehavior) -> PrefabDom {
    json!({
        "ContainerEntity": { "Id": "Root", "Name": "Hero", "Components": {} },
        "Entities": {
            "Body": {
                "Id": "E1",
                "Components": {
                    "Mesh": {
                        "mesh": {
                            "assetId": { "guid": format!("{{{}}}", mesh), "subId": 1 },
                            "assetType": mesh_type().0.to_string(),
                            "loadBehavior": reference
                        }
                    }
                }
            },
            "Gizmo": {
                "Id": "E2",
                "Components": { "EditorInfo": { "IsEditorOnly": true } }
            }
        }
    })
}

struct Fixture {
    registry: Arc<RecordingRegistry>,
    templates: Arc<TemplateLibrary>,
    paths: Arc<ProjectPathResolver>,
    profiles: Arc<ProcessorStackProfiles>,
}

impl Fixture {
    fn new() -> Self {
        let _ = env_logger::try_init();

        let templates = TemplateLibrary::new();
        templates
            .add_template_with_id(
                HERO,
                "Prefabs/Hero.prefab",
                hero(Uuid::new_v4(), AssetLoadBehavior::NoLoad),
            )
            .unwrap();

        let mut paths = ProjectPathResolver::new("/project");
        paths.add("prefabs:", "/project/Prefabs/").unwrap();

        Fixture {
            registry: Arc::new(RecordingRegistry::new()),
            templates: Arc::new(templates),
            paths: Arc::new(paths),
            profiles: profiles(),
        }
    }

    fn services(&self) -> PrefabServices {
        PrefabServices::new(self.templates.clone(), self.paths.clone())
    }

    fn container(&self, profile: &str) -> InMemorySpawnableAssetContainer {
        let mut container =
            InMemorySpawnableAssetContainer::new(self.registry.clone(), self.profiles.clone());
        assert!(container.activate(profile, self.services()));
        container
    }
}

#[test]
fn create() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);
    assert!(container.is_activated());
    assert_eq!(container.stock_profile(), INTEGRATION_TESTS);

    let root = container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();

    assert!(container.has_in_memory_spawnable_asset("Hero"));
    assert_eq!(container.in_memory_spawnable_asset_id("Hero"), root.id());
    assert_eq!(root.asset_type(), AssetType::spawnable());
    assert!(root.is_ready());

    let catalog = fixture.registry.catalog();
    assert_eq!(catalog.asset_id_by_path("Hero.spawnable"), Some(root.id()));
    assert_eq!(
        catalog.asset_info(root.id()).unwrap().size_bytes,
        root.payload().unwrap().len() as u64
    );

    let live = fixture.registry.manager().find_asset(root.id()).unwrap();
    assert!(live.is_ready());

    let spawnable = Spawnable::decode(&live.payload().unwrap()).unwrap();
    let ids: Vec<_> = spawnable.entities.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["Root", "E1"]);
}

#[test]
fn hero_from_template_42() {
    let fixture = Fixture::new();
    let mut container = fixture.container("Networked");

    let root = container
        .create_in_memory_spawnable_asset(42, "Hero", false)
        .unwrap();

    let entry = &container.all_in_memory_spawnable_assets()["Hero"];
    assert_eq!(entry.assets().len(), 2);
    assert_eq!(entry.root().id(), root.id());
    assert_eq!(entry.root().asset_type(), AssetType::spawnable());
    assert_eq!(container.in_memory_spawnable_asset_id("Hero"), root.id());

    let catalog = fixture.registry.catalog();
    assert_eq!(catalog.asset_id_by_path("Hero.spawnable"), Some(root.id()));

    let side = &entry.assets()[1 - entry.root_index()];
    assert_eq!(side.asset_type(), network_type());
    assert_eq!(catalog.asset_id_by_path("Hero.network"), Some(side.id()));
    assert_eq!(side.id().guid, root.id().guid);
}

#[test]
fn duplicate_name() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);

    let root = container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();

    match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
        Err(ContainerError::DuplicateName(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(container.all_in_memory_spawnable_assets().len(), 1);
    assert_eq!(container.in_memory_spawnable_asset_id("Hero"), root.id());
    assert_eq!(fixture.registry.registered(), 1);
}

#[test]
fn remove() {
    let fixture = Fixture::new();
    let mut container = fixture.container("Networked");

    container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();

    let ids: Vec<_> = container.all_in_memory_spawnable_assets()["Hero"]
        .assets()
        .iter()
        .map(|v| v.id())
        .collect();

    container.remove_in_memory_spawnable_asset("Hero").unwrap();
    assert!(!container.has_in_memory_spawnable_asset("Hero"));
    assert_eq!(container.in_memory_spawnable_asset_id("Hero"), AssetId::invalid());

    for &id in &ids {
        assert_eq!(fixture.registry.unregistered_times(id), 1);
        assert!(!fixture.registry.catalog().contains(id));
        assert!(fixture.registry.manager().find_asset(id).is_none());
    }

    let err = container
        .remove_in_memory_spawnable_asset("Hero")
        .unwrap_err();
    assert!(match err {
        ContainerError::NotFound(_) => true,
        _ => false,
    });
    assert!(!err.message().is_empty());
    assert_eq!(fixture.registry.unregistered(), ids.len());
}

#[test]
fn clear_all() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);

    let names: Vec<String> = (0..8)
        .map(|i| format!("Hero{}_{}", i, rand::random::<u32>()))
        .collect();

    for name in &names {
        container
            .create_in_memory_spawnable_asset(HERO, name, false)
            .unwrap();
    }

    assert_eq!(fixture.registry.catalog().len(), names.len());

    container.clear_all_in_memory_spawnable_assets();
    for name in &names {
        assert!(!container.has_in_memory_spawnable_asset(name));
    }

    assert!(container.all_in_memory_spawnable_assets().is_empty());
    assert!(fixture.registry.catalog().is_empty());
    assert_eq!(fixture.registry.unregistered(), names.len());
}

#[test]
fn not_activated() {
    let fixture = Fixture::new();
    let mut container =
        InMemorySpawnableAssetContainer::new(fixture.registry.clone(), fixture.profiles.clone());
    assert!(!container.is_activated());

    match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
        Err(ContainerError::NotActivated(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    match container.create_in_memory_spawnable_asset_from_path("prefabs:Hero.prefab", "Hero", false)
    {
        Err(ContainerError::NotActivated(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    // A profile that can't be loaded leaves the container deactivated.
    assert!(!container.activate("Undefined", fixture.services()));
    assert!(!container.is_activated());

    match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
        Err(ContainerError::NotActivated(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(container.all_in_memory_spawnable_assets().is_empty());
    assert_eq!(fixture.registry.registered(), 0);
}

#[test]
fn template_not_found() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);

    match container.create_in_memory_spawnable_asset(7, "Villain", false) {
        Err(ContainerError::TemplateNotFound(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    match container.create_in_memory_spawnable_asset_from_path(
        "prefabs:Villain.prefab",
        "Villain",
        false,
    ) {
        Err(ContainerError::TemplateNotFound(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(container.all_in_memory_spawnable_assets().is_empty());
}

#[test]
fn create_from_path() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);

    let root = container
        .create_in_memory_spawnable_asset_from_path("prefabs:Hero.prefab", "Hero", false)
        .unwrap();
    assert_eq!(container.in_memory_spawnable_asset_id("Hero"), root.id());

    let root = container
        .create_in_memory_spawnable_asset_from_path("/project/Prefabs/Hero.prefab", "Hero2", false)
        .unwrap();
    assert_eq!(container.in_memory_spawnable_asset_id("Hero2"), root.id());
}

#[test]
fn conversion_failed() {
    let fixture = Fixture::new();

    for profile in &["Empty", "Broken"] {
        let mut container = fixture.container(profile);

        match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
            Err(ContainerError::ConversionFailed(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert!(!container.has_in_memory_spawnable_asset("Hero"));
    }

    assert_eq!(fixture.registry.registered(), 0);
    assert!(fixture.registry.catalog().is_empty());
}

#[test]
fn root_not_produced() {
    let fixture = Fixture::new();
    let mut container = fixture.container("Rootless");

    match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
        Err(ContainerError::RootNotProduced(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(container.all_in_memory_spawnable_assets().is_empty());
    assert_eq!(fixture.registry.registered(), 1);
    assert_eq!(fixture.registry.unregistered(), 1);
    assert!(fixture.registry.catalog().is_empty());
    assert!(fixture.registry.manager().is_empty());
}

#[test]
fn root_without_data() {
    let fixture = Fixture::new();
    let mut container = fixture.container("Stripped");

    match container.create_in_memory_spawnable_asset(HERO, "Hero", false) {
        Err(ContainerError::RootNotProduced(msg)) => {
            assert!(msg.contains("Hero.spawnable was produced without data"));
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(container.all_in_memory_spawnable_assets().is_empty());
    assert_eq!(fixture.registry.registered(), 0);
    assert!(fixture.registry.catalog().is_empty());
}

#[test]
fn preload_referenced_assets() {
    let fixture = Fixture::new();
    fixture.registry.manager().register_handler(
        mesh_type(),
        |_: AssetId, _: AssetType| -> Result<Box<[u8]>> {
            thread::sleep(Duration::from_millis(20));
            Ok(vec![0u8; 16].into_boxed_slice())
        },
    );

    let mesh = Uuid::new_v4();
    let template = fixture.templates.add_template(
        "Prefabs/Preloaded.prefab",
        hero(mesh, AssetLoadBehavior::PreLoad),
    );

    let mut container = fixture.container(INTEGRATION_TESTS);
    container
        .create_in_memory_spawnable_asset(template, "Preloaded", true)
        .unwrap();

    let entry = &container.all_in_memory_spawnable_assets()["Preloaded"];
    assert_eq!(entry.referenced_assets().len(), 1);

    let reference = &entry.referenced_assets()[0];
    assert_eq!(reference.id(), AssetId::new(mesh, 1));
    assert_eq!(reference.status(), AssetStatus::Ready);

    let live = fixture
        .registry
        .manager()
        .find_asset(AssetId::new(mesh, 1))
        .unwrap();
    assert_eq!(live.payload().unwrap().len(), 16);

    // The references are not requested at all without `load_referenced_assets`.
    let mesh = Uuid::new_v4();
    let template = fixture.templates.add_template(
        "Prefabs/Lazy.prefab",
        hero(mesh, AssetLoadBehavior::PreLoad),
    );

    container
        .create_in_memory_spawnable_asset(template, "Lazy", false)
        .unwrap();

    let entry = &container.all_in_memory_spawnable_assets()["Lazy"];
    assert!(!entry.referenced_assets()[0].has_data());
    assert!(fixture
        .registry
        .manager()
        .find_asset(AssetId::new(mesh, 1))
        .is_none());
}

#[test]
fn referenced_asset_failures_are_not_fatal() {
    let fixture = Fixture::new();

    // No handler is registered for meshes, so the load ends up in the error state.
    let mesh = Uuid::new_v4();
    let mut dom = hero(mesh, AssetLoadBehavior::PreLoad);
    dom["Entities"]["Body"]["Components"]["Broken"] =
        json!({ "assetId": { "guid": "not-a-guid", "subId": 0 }, "loadBehavior": "PreLoad" });
    let template = fixture.templates.add_template("Prefabs/Broken.prefab", dom);

    let mut container = fixture.container(INTEGRATION_TESTS);
    let root = container
        .create_in_memory_spawnable_asset(template, "Broken", true)
        .unwrap();
    assert!(root.is_ready());

    let entry = &container.all_in_memory_spawnable_assets()["Broken"];
    assert_eq!(entry.referenced_assets().len(), 2);

    for reference in entry.referenced_assets() {
        if reference.id().is_valid() {
            assert!(reference.is_error());
        } else {
            assert!(!reference.has_data());
        }
    }
}

#[test]
fn move_all() {
    let fixture = Fixture::new();
    let mut container = fixture.container("Networked");

    container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();
    container
        .create_in_memory_spawnable_asset(HERO, "Hero2", false)
        .unwrap();

    let mut moved = container.move_all_in_memory_spawnable_assets();
    assert_eq!(moved.len(), 2);
    assert!(container.all_in_memory_spawnable_assets().is_empty());
    assert!(!container.has_in_memory_spawnable_asset("Hero"));

    // The container does not own the moved registrations anymore.
    container.deactivate();
    drop(container);
    assert_eq!(fixture.registry.unregistered(), 0);
    assert_eq!(fixture.registry.catalog().len(), 4);

    for entry in moved.values_mut() {
        let id = entry.spawnable_asset_id();
        assert!(fixture.registry.catalog().contains(id));
        release_assets(&*fixture.registry, entry.assets_mut());
    }

    assert!(fixture.registry.catalog().is_empty());
}

#[test]
fn deactivate() {
    let fixture = Fixture::new();
    let mut container = fixture.container(INTEGRATION_TESTS);

    container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();

    container.deactivate();
    assert!(!container.is_activated());
    assert_eq!(container.stock_profile(), "");
    assert!(!container.has_in_memory_spawnable_asset("Hero"));
    assert_eq!(fixture.registry.unregistered(), 1);

    // Idempotent.
    container.deactivate();
    assert_eq!(fixture.registry.unregistered(), 1);

    // Could be activated again.
    assert!(container.activate(PLAY_IN_EDITOR, fixture.services()));
    container
        .create_in_memory_spawnable_asset(HERO, "Hero", false)
        .unwrap();

    drop(container);
    assert_eq!(fixture.registry.unregistered(), 2);
    assert!(fixture.registry.catalog().is_empty());
}

#[test]
fn identities_are_scoped() {
    let fixture = Fixture::new();
    let mut c1 = fixture.container(INTEGRATION_TESTS);
    let mut c2 = fixture.container(INTEGRATION_TESTS);

    let r1 = c1.create_in_memory_spawnable_asset(HERO, "Hero", false).unwrap();
    let r2 = c2.create_in_memory_spawnable_asset(HERO, "Hero", false).unwrap();
    assert_ne!(r1.id(), r2.id());
    assert_eq!(fixture.registry.catalog().len(), 2);

    c1.remove_in_memory_spawnable_asset("Hero").unwrap();
    assert!(fixture.registry.catalog().contains(r2.id()));
}

#[test]
fn preloads_are_issued_before_waiting() {
    const MESHES: usize = 3;

    let fixture = Fixture::new();

    // Every load blocks until all of them are in flight.
    let barrier = Arc::new(Barrier::new(MESHES));
    fixture.registry.manager().register_handler(
        mesh_type(),
        move |_: AssetId, _: AssetType| -> Result<Box<[u8]>> {
            barrier.wait();
            Ok(vec![0u8; 8].into_boxed_slice())
        },
    );

    let mesh = Uuid::new_v4();
    let mut entities = serde_json::Map::new();
    for i in 0..MESHES {
        entities.insert(
            format!("Body{}", i),
            json!({
                "Id": format!("E{}", i),
                "Components": {
                    "Mesh": {
                        "mesh": {
                            "assetId": { "guid": mesh.to_string(), "subId": i + 1 },
                            "assetType": mesh_type().0.to_string(),
                            "loadBehavior": "PreLoad"
                        }
                    }
                }
            }),
        );
    }

    let template = fixture.templates.add_template(
        "Prefabs/Crowd.prefab",
        json!({ "ContainerEntity": { "Id": "Root" }, "Entities": entities }),
    );

    let mut container = fixture.container(INTEGRATION_TESTS);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = container.create_in_memory_spawnable_asset(template, "Crowd", true);
        let statuses: Vec<_> = container.all_in_memory_spawnable_assets()["Crowd"]
            .referenced_assets()
            .iter()
            .map(|v| v.status())
            .collect();

        tx.send((result.is_ok(), statuses)).unwrap();
    });

    let (created, statuses) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("deadlock found!");

    assert!(created);
    assert_eq!(statuses, vec![AssetStatus::Ready; MESHES]);
}
