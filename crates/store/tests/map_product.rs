use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};
use tessera_registry::{ExtensionRegistry, Payload, RegistryConfig};
use tessera_store::map_product::{
	self, ADD_ELEMENTS, AddElements, REMOVE_ELEMENTS, RemoveElements,
};
use tessera_store::{Action, document_store_point, reduce, undo_action_for};

#[fixture]
fn registry() -> ExtensionRegistry<Payload> {
	let registry = ExtensionRegistry::with_config(RegistryConfig::named("store-test"));
	document_store_point(&registry).unwrap();
	map_product::register_map_product(&registry).unwrap();
	registry
}

#[fixture]
fn state() -> Value {
	json!({
		"product": {
			"workspaces": {
				"w1": {
					"products": {
						"p1": {
							"title": "Map",
							"extendedData": { "vertices": { "v1": { "x": 1, "y": 2 } } }
						}
					}
				}
			}
		}
	})
}

fn vertices(state: &Value) -> &Value {
	state
		.pointer("/product/workspaces/w1/products/p1/extendedData/vertices")
		.unwrap()
}

fn positions(value: Value) -> Map<String, Value> {
	value.as_object().cloned().unwrap()
}

fn add(vertices: Value) -> AddElements {
	AddElements {
		workspace_id: "w1".into(),
		product_id: "p1".into(),
		vertices: positions(vertices),
	}
}

fn remove(ids: &[&str]) -> RemoveElements {
	RemoveElements {
		workspace_id: "w1".into(),
		product_id: "p1".into(),
		vertex_ids: ids.iter().map(|id| id.to_string()).collect(),
	}
}

#[rstest]
fn add_elements_places_vertices(registry: ExtensionRegistry<Payload>, state: Value) {
	let action = map_product::add_elements(&add(json!({ "v2": { "x": 5, "y": 6 } }))).unwrap();
	let next = reduce(&registry, &state, &action);

	assert_eq!(
		vertices(&next),
		&json!({ "v1": { "x": 1, "y": 2 }, "v2": { "x": 5, "y": 6 } })
	);
	assert_eq!(
		next.pointer("/product/workspaces/w1/products/p1/title"),
		Some(&json!("Map"))
	);
}

#[rstest]
#[case::no_extended_data(json!({}))]
#[case::no_vertex_map(json!({ "extendedData": {} }))]
#[case::null_vertex_map(json!({ "extendedData": { "vertices": null } }))]
fn add_elements_requires_a_vertex_map(registry: ExtensionRegistry<Payload>, #[case] product: Value) {
	let state = json!({ "product": { "workspaces": { "w1": { "products": { "p1": product } } } } });
	let action = map_product::add_elements(&add(json!({ "v9": { "x": 0, "y": 0 } }))).unwrap();

	assert_eq!(reduce(&registry, &state, &action), state);
}

#[rstest]
fn add_elements_fills_an_empty_vertex_map(registry: ExtensionRegistry<Payload>) {
	let state = json!({
		"product": { "workspaces": { "w1": { "products": { "p1": { "extendedData": { "vertices": {} } } } } } }
	});
	let action = map_product::add_elements(&add(json!({ "v9": { "x": 0, "y": 0 } }))).unwrap();
	let next = reduce(&registry, &state, &action);

	assert_eq!(vertices(&next), &json!({ "v9": { "x": 0, "y": 0 } }));
}

#[rstest]
fn actions_against_unknown_products_are_ignored(registry: ExtensionRegistry<Payload>, state: Value) {
	let mut payload = add(json!({ "v2": { "x": 5, "y": 6 } }));
	payload.product_id = "missing".into();
	let action = map_product::add_elements(&payload).unwrap();

	assert_eq!(reduce(&registry, &state, &action), state);
}

#[rstest]
fn remove_elements_omits_vertices(registry: ExtensionRegistry<Payload>, state: Value) {
	let added = reduce(
		&registry,
		&state,
		&map_product::add_elements(&add(json!({ "v2": { "x": 5, "y": 6 } }))).unwrap(),
	);
	let action = map_product::remove_elements(&remove(&["v1", "unknown"])).unwrap();
	let next = reduce(&registry, &added, &action);

	assert_eq!(vertices(&next), &json!({ "v2": { "x": 5, "y": 6 } }));
}

#[rstest]
#[case::unknown_kind(Action::new("SOMETHING_ELSE", json!({})))]
#[case::malformed_add(Action::new(ADD_ELEMENTS, json!({ "workspaceId": "w1" })))]
#[case::malformed_remove(Action::new(REMOVE_ELEMENTS, json!("v1")))]
fn unhandled_actions_leave_state_alone(
	registry: ExtensionRegistry<Payload>,
	state: Value,
	#[case] action: Action,
) {
	assert_eq!(reduce(&registry, &state, &action), state);
}

#[rstest]
fn undo_and_redo_of_add(registry: ExtensionRegistry<Payload>, state: Value) {
	let payload = add(json!({ "v2": { "x": 5, "y": 6 } }));
	let added = reduce(&registry, &state, &map_product::add_elements(&payload).unwrap());
	let undo_payload = serde_json::to_value(&payload).unwrap();
	let undo = undo_action_for(&registry, ADD_ELEMENTS).unwrap();

	let undo_action = (undo.undo)(&undo_payload).unwrap();
	assert_eq!(undo_action.kind, REMOVE_ELEMENTS);
	let undone = reduce(&registry, &added, &undo_action);
	assert_eq!(undone, state);

	let redone = reduce(&registry, &undone, &(undo.redo)(&undo_payload).unwrap());
	assert_eq!(redone, added);
}

#[rstest]
fn undo_and_redo_of_remove(registry: ExtensionRegistry<Payload>, state: Value) {
	let payload = remove(&["v1"]);
	let undo_payload =
		serde_json::to_value(map_product::removed_elements(&state["product"], &payload)).unwrap();
	let removed = reduce(&registry, &state, &map_product::remove_elements(&payload).unwrap());
	assert_eq!(vertices(&removed), &json!({}));

	let undo = undo_action_for(&registry, REMOVE_ELEMENTS).unwrap();
	let restored = reduce(&registry, &removed, &(undo.undo)(&undo_payload).unwrap());
	assert_eq!(restored, state);

	let redone = reduce(&registry, &restored, &(undo.redo)(&undo_payload).unwrap());
	assert_eq!(redone, removed);
}

#[rstest]
fn removed_elements_skips_vertices_not_on_the_product(state: Value) {
	let recorded = map_product::removed_elements(&state["product"], &remove(&["v1", "ghost"]));
	assert_eq!(recorded.vertices, positions(json!({ "v1": { "x": 1, "y": 2 } })));
}

#[rstest]
fn undo_builders_reject_malformed_payloads(registry: ExtensionRegistry<Payload>) {
	let undo = undo_action_for(&registry, ADD_ELEMENTS).unwrap();
	assert!((undo.undo)(&json!(42)).is_err());
}
