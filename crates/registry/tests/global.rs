//! The process-wide registry behind the free functions.

use std::sync::Arc;

use serial_test::serial;
use tessera_registry::global::{self, Payload};
use tessera_registry::{DocOptions, RegistryError};

fn always(_: &Payload) -> bool {
	true
}

fn strings(payloads: &[Payload]) -> Vec<&str> {
	payloads
		.iter()
		.filter_map(|payload| global::downcast::<&str>(payload).copied())
		.collect()
}

#[test]
#[serial]
fn free_functions_share_one_registry() {
	global::clear();
	let id = global::register_extension("a", global::payload("A")).unwrap();
	global::document_extension_point("a", "desc", always, DocOptions::default()).unwrap();

	let first = global::extensions_for_point("a");
	assert_eq!(strings(&first), ["A"]);
	assert!(Arc::ptr_eq(&first, &global::registry().extensions_for_point("a")));

	global::unregister_extension(id);
	global::unregister_extension(id);
	assert!(global::extensions_for_point("a").is_empty());
}

#[test]
#[serial]
fn subset_scenario() {
	global::clear();
	global::register_extension("a", global::payload("A")).unwrap();
	global::register_extension("b", global::payload("B")).unwrap();
	global::register_extension("c", global::payload("C")).unwrap();
	global::document_extension_point("a", "desc", always, DocOptions::default()).unwrap();
	global::document_extension_point("b", "desc", always, DocOptions::default()).unwrap();
	global::document_extension_point("c", "desc", |_: &Payload| false, DocOptions::default())
		.unwrap();

	let map = global::extensions_for_points(["a", "b", "c"]);
	assert_eq!(strings(&map["a"]), ["A"]);
	assert_eq!(strings(&map["b"]), ["B"]);
	assert!(map["c"].is_empty());

	global::register_extension("d", global::payload("D")).unwrap();
	global::document_extension_point("d", "desc", always, DocOptions::default()).unwrap();
	assert!(Arc::ptr_eq(&map, &global::extensions_for_points(["b", "a", "c"])));
}

#[test]
#[serial]
fn validators_see_type_erased_payloads() {
	global::clear();
	global::register_extension("numbers", global::payload(7_u32)).unwrap();
	global::document_extension_point(
		"numbers",
		"unsigned integers only",
		|payload: &Payload| global::downcast::<u32>(payload).is_some(),
		"https://example.com/numbers",
	)
	.unwrap();

	let numbers = global::extensions_for_point("numbers");
	assert_eq!(global::downcast::<u32>(&numbers[0]), Some(&7));

	global::register_extension("numbers", global::payload("seven")).unwrap();
	assert!(global::extensions_for_point("numbers").is_empty());

	let docs = global::extension_point_documentation();
	assert_eq!(
		docs["numbers"].external_documentation_url.as_deref(),
		Some("https://example.com/numbers")
	);
}

#[test]
#[serial]
fn missing_point_name_is_rejected() {
	global::clear();
	let err = global::register_extension("", global::payload(())).unwrap_err();
	assert!(matches!(err, RegistryError::InvalidArgument(ref message) if message.contains("extension")));
}
