//! Integration tests for the menagerie domain model.

use serde_json::json;

use menagerie::ids::{
    CaptureTypeId, CollectionId, CollectionTypeId, OrganismTypeId, SamplingEventDeviceId,
};
use menagerie::{CaptureType, Menagerie, MetadataSchema, Organism, OrganismCapture, OrganismType};

/// Everything a capture scenario needs: a "Forest Survey" collection type
/// allowing cameras, a collection, a sampling event with a camera device,
/// "Mammal" organisms enabled, and a "Camera Trap Photo" capture type
/// joined to the configuration.
struct CameraTrapWorld {
    zoo: Menagerie,
    forest: CollectionTypeId,
    collection: CollectionId,
    camera_device: SamplingEventDeviceId,
    mammal: OrganismTypeId,
    photo: CaptureTypeId,
}

fn camera_trap_world() -> CameraTrapWorld {
    let mut zoo = Menagerie::new();
    let camera = zoo.add_device_category("Camera").unwrap();
    let forest = zoo.add_collection_type("Forest Survey", [camera]).unwrap();
    let collection = zoo.add_collection("Spring survey", forest).unwrap();
    let event = zoo.add_sampling_event(collection).unwrap();
    let camera_device = zoo.add_sampling_event_device(event, camera).unwrap();

    let mammal = zoo.allocate_id();
    zoo.register_organism_type(OrganismType::new(mammal, "Mammal"))
        .unwrap();
    let photo = zoo.allocate_id();
    zoo.register_capture_type(CaptureType::new(photo, "Camera Trap Photo", mammal, camera))
        .unwrap();

    zoo.configure_organisms(forest, true).unwrap();
    zoo.allow_organism_type(forest, mammal, MetadataSchema::simple())
        .unwrap();
    zoo.allow_capture_type(forest, photo, MetadataSchema::simple())
        .unwrap();

    CameraTrapWorld {
        zoo,
        forest,
        collection,
        camera_device,
        mammal,
        photo,
    }
}

// =============================================================================
// Forest Survey scenario (organisms toggle + type membership)
// =============================================================================

#[test]
fn test_forest_survey_scenario() {
    let mut zoo = Menagerie::new();
    let camera = zoo.add_device_category("Camera").unwrap();
    let forest = zoo.add_collection_type("Forest Survey", [camera]).unwrap();
    let collection = zoo.add_collection("Spring survey", forest).unwrap();

    let bird = zoo.allocate_id();
    zoo.register_organism_type(OrganismType::new(bird, "Bird"))
        .unwrap();

    // Organisms disabled: creation fails.
    zoo.configure_organisms(forest, false).unwrap();
    let id = zoo.allocate_id();
    let err = zoo.save_organism(Organism::new(id, collection, bird)).unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().messages("collection"),
        ["this collection does not allow organisms"]
    );

    // Enable organisms, but Bird is still not joined.
    zoo.set_use_organisms(forest, true).unwrap();
    let id = zoo.allocate_id();
    let err = zoo.save_organism(Organism::new(id, collection, bird)).unwrap_err();
    assert!(
        err.field_errors().unwrap().messages("organism_type")[0]
            .contains("not accepted in collections of type 'Forest Survey'")
    );

    // Join Bird with the default (accept-any-object) overlay: `{}` passes.
    zoo.allow_organism_type(forest, bird, MetadataSchema::simple())
        .unwrap();
    let id = zoo.allocate_id();
    let saved = zoo
        .save_organism(Organism::new(id, collection, bird).with_identification_info(json!({})))
        .unwrap();
    assert_eq!(zoo.store().organism(saved).unwrap().organism_type, bird);
}

#[test]
fn test_strict_bird_schema_rejects_empty_object() {
    let mut zoo = Menagerie::new();
    let camera = zoo.add_device_category("Camera").unwrap();
    let forest = zoo.add_collection_type("Forest Survey", [camera]).unwrap();
    let collection = zoo.add_collection("Spring survey", forest).unwrap();

    let bird = zoo.allocate_id();
    zoo.register_organism_type(
        OrganismType::new(bird, "Bird").with_identification_info_schema(
            MetadataSchema::new(json!({
                "type": "object",
                "properties": {"species": {"type": "string"}},
                "required": ["species"]
            }))
            .unwrap(),
        ),
    )
    .unwrap();
    zoo.configure_organisms(forest, true).unwrap();
    zoo.allow_organism_type(forest, bird, MetadataSchema::simple())
        .unwrap();

    let id = zoo.allocate_id();
    let err = zoo.save_organism(Organism::new(id, collection, bird)).unwrap_err();
    assert!(
        err.field_errors().unwrap().messages("identification_info")[0].contains("species")
    );

    let id = zoo.allocate_id();
    let organism = Organism::new(id, collection, bird)
        .with_identification_info(json!({"species": "Turdus migratorius"}));
    assert!(zoo.save_organism(organism).is_ok());
}

// =============================================================================
// Capture scenarios (device and organism-type cross-checks)
// =============================================================================

#[test]
fn test_capture_happy_path() {
    let mut world = camera_trap_world();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, deer, world.photo, world.camera_device);
    let saved = world.zoo.save_capture(capture).unwrap();
    assert_eq!(world.zoo.store().capture(saved).unwrap().organism, deer);
}

#[test]
fn test_capture_device_category_mismatch() {
    let mut world = camera_trap_world();

    // Deploy an audio recorder in the same survey; the mismatch under
    // test is against the capture type's declared device category.
    let audio = world.zoo.add_device_category("Audio Recorder").unwrap();
    let event = world.zoo.add_sampling_event(world.collection).unwrap();
    let recorder_device = world.zoo.add_sampling_event_device(event, audio).unwrap();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, deer, world.photo, recorder_device);
    let err = world.zoo.save_capture(capture).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.messages("sampling_event_device")[0].contains("'Audio Recorder'"));
    assert!(errors.messages("sampling_event_device")[0].contains("'Camera'"));
}

#[test]
fn test_capture_organism_type_mismatch() {
    let mut world = camera_trap_world();

    // A Bird organism in a collection whose config also allows Bird.
    let bird = world.zoo.allocate_id();
    world
        .zoo
        .register_organism_type(OrganismType::new(bird, "Bird"))
        .unwrap();
    world
        .zoo
        .allow_organism_type(world.forest, bird, MetadataSchema::simple())
        .unwrap();
    let robin = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(robin, world.collection, bird))
        .unwrap();

    // "Camera Trap Photo" captures Mammals, not Birds.
    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, robin, world.photo, world.camera_device);
    let err = world.zoo.save_capture(capture).unwrap_err();
    let messages = err.field_errors().unwrap().messages("organism");
    assert!(messages[0].contains("'Mammal'"));
    assert!(messages[0].contains("'Bird'"));
}

#[test]
fn test_capture_rejected_when_organisms_disabled() {
    let mut world = camera_trap_world();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    // Disabling organisms closes the collection to captures too.
    world.zoo.set_use_organisms(world.forest, false).unwrap();

    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, deer, world.photo, world.camera_device);
    let err = world.zoo.save_capture(capture).unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().messages("collection"),
        ["this collection does not allow organisms"]
    );
    assert_eq!(world.zoo.store().captures().count(), 0);
}

#[test]
fn test_capture_error_fields_follow_pipeline_order() {
    let mut world = camera_trap_world();

    // A Bird organism (allowed in the config) and an audio recorder
    // deployment, then the photo capture type is withdrawn. A capture of
    // the bird from the recorder now fails membership, the organism-type
    // cross-check, and the device-category cross-check at once.
    let bird = world.zoo.allocate_id();
    world
        .zoo
        .register_organism_type(OrganismType::new(bird, "Bird"))
        .unwrap();
    world
        .zoo
        .allow_organism_type(world.forest, bird, MetadataSchema::simple())
        .unwrap();
    let robin = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(robin, world.collection, bird))
        .unwrap();

    let audio = world.zoo.add_device_category("Audio Recorder").unwrap();
    let event = world.zoo.add_sampling_event(world.collection).unwrap();
    let recorder_device = world.zoo.add_sampling_event_device(event, audio).unwrap();

    world
        .zoo
        .disallow_capture_type(world.forest, world.photo)
        .unwrap();

    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, robin, world.photo, recorder_device);
    let err = world.zoo.save_capture(capture).unwrap_err();
    let errors = err.field_errors().unwrap();
    let fields: Vec<&str> = errors.fields().collect();
    assert_eq!(fields, ["capture_type", "organism", "sampling_event_device"]);
}

#[test]
fn test_capture_type_not_joined() {
    let mut world = camera_trap_world();
    world
        .zoo
        .disallow_capture_type(world.forest, world.photo)
        .unwrap();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    let id = world.zoo.allocate_id();
    let capture = OrganismCapture::new(id, deer, world.photo, world.camera_device);
    let err = world.zoo.save_capture(capture).unwrap_err();
    assert!(
        err.field_errors().unwrap().messages("capture_type")[0]
            .contains("not accepted in collections of type 'Forest Survey'")
    );
}

#[test]
fn test_capture_overlay_schema_enforced() {
    let mut world = camera_trap_world();
    world
        .zoo
        .disallow_capture_type(world.forest, world.photo)
        .unwrap();
    world
        .zoo
        .allow_capture_type(
            world.forest,
            world.photo,
            MetadataSchema::new(json!({
                "type": "object",
                "properties": {"flash_used": {"type": "boolean"}},
                "required": ["flash_used"]
            }))
            .unwrap(),
        )
        .unwrap();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    let id = world.zoo.allocate_id();
    let bare = OrganismCapture::new(id, deer, world.photo, world.camera_device);
    let err = world.zoo.save_capture(bare.clone()).unwrap_err();
    assert!(
        err.field_errors().unwrap().messages("additional_metadata")[0].contains("flash_used")
    );

    let flashed = bare.with_additional_metadata(json!({"flash_used": true}));
    assert!(world.zoo.save_capture(flashed).is_ok());
}

// =============================================================================
// Labels
// =============================================================================

#[test]
fn test_labels_validated_against_type_term_categories() {
    let mut zoo = Menagerie::new();
    let camera = zoo.add_device_category("Camera").unwrap();
    let forest = zoo.add_collection_type("Forest Survey", [camera]).unwrap();
    let collection = zoo.add_collection("Spring survey", forest).unwrap();

    let life_stage = zoo.add_term_category("Life Stage").unwrap();
    let habitat = zoo.add_term_category("Habitat").unwrap();
    let juvenile = zoo.add_term(life_stage, "Juvenile").unwrap();
    let riparian = zoo.add_term(habitat, "Riparian").unwrap();

    let bird = zoo.allocate_id();
    zoo.register_organism_type(OrganismType::new(bird, "Bird").with_term_category(life_stage))
        .unwrap();
    zoo.configure_organisms(forest, true).unwrap();
    zoo.allow_organism_type(forest, bird, MetadataSchema::simple())
        .unwrap();

    let id = zoo.allocate_id();
    let labelled = Organism::new(id, collection, bird).with_label(juvenile);
    assert!(zoo.save_organism(labelled).is_ok());

    let id = zoo.allocate_id();
    let mislabelled = Organism::new(id, collection, bird).with_label(riparian);
    let err = zoo.save_organism(mislabelled).unwrap_err();
    assert!(err.field_errors().unwrap().messages("labels")[0].contains("'Habitat'"));
}

// =============================================================================
// Deletion policy
// =============================================================================

#[test]
fn test_protective_and_cascading_deletion() {
    let mut world = camera_trap_world();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();

    // Mammal is referenced by an organism: protected.
    assert!(world.zoo.remove_organism_type(world.mammal).is_err());

    // The organism is not referenced by captures yet: deletable. After
    // that, Mammal is still pinned by the capture type and the config.
    world.zoo.remove_organism(deer).unwrap();
    assert!(world.zoo.remove_organism_type(world.mammal).is_err());

    // Dropping the configuration cascades both join rows but leaves the
    // types alone.
    world.zoo.remove_configuration(world.forest).unwrap();
    assert!(world.zoo.store().config(world.forest).is_none());
    assert!(world.zoo.store().organism_type(world.mammal).is_ok());
    assert!(world.zoo.store().capture_type(world.photo).is_ok());

    // Capture type still references Mammal: protected until it goes.
    assert!(world.zoo.remove_organism_type(world.mammal).is_err());
    world.zoo.remove_capture_type(world.photo).unwrap();
    world.zoo.remove_organism_type(world.mammal).unwrap();
}

#[test]
fn test_organism_protected_while_captured() {
    let mut world = camera_trap_world();

    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal))
        .unwrap();
    let capture_id = world.zoo.allocate_id();
    world
        .zoo
        .save_capture(OrganismCapture::new(
            capture_id,
            deer,
            world.photo,
            world.camera_device,
        ))
        .unwrap();

    assert!(world.zoo.remove_organism(deer).is_err());
    world.zoo.remove_capture(capture_id).unwrap();
    assert!(world.zoo.remove_organism(deer).is_ok());
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_save_load_round_trip_preserves_validation() {
    let mut world = camera_trap_world();
    let deer = world.zoo.allocate_id();
    world
        .zoo
        .save_organism(Organism::new(deer, world.collection, world.mammal).with_name("Doe #3"))
        .unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    world.zoo.save(file.path()).unwrap();

    let mut reloaded = Menagerie::load(file.path()).unwrap();
    assert_eq!(
        reloaded.store().organism(deer).unwrap().name.as_deref(),
        Some("Doe #3")
    );

    // Validation still works against the reloaded configuration.
    let bird = reloaded.allocate_id();
    reloaded
        .register_organism_type(OrganismType::new(bird, "Bird"))
        .unwrap();
    let id = reloaded.allocate_id();
    let err = reloaded
        .save_organism(Organism::new(id, world.collection, bird))
        .unwrap_err();
    assert!(err.field_errors().is_some());

    // And id allocation continues past the persisted counter.
    assert!(bird.0 > deer.0);
}
