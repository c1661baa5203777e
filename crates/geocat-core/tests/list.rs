mod support;
use support::*;

use geocat_core::{record, Attribute, ListValue, MappingType, Owner, Schema, Value};

use serde_json::json;
use std::sync::Arc;

fn file_type() -> Arc<MappingType> {
    MappingType::new(
        Schema::builder("File")
            .attribute("href", Attribute::new())
            .build(),
    )
}

fn schema(file: &Arc<MappingType>) -> Arc<Schema> {
    Schema::builder("image")
        .attribute("tags", Attribute::list(Attribute::new()))
        .attribute("files", Attribute::list(Attribute::mapping(file)))
        .attribute("fixed", Attribute::list(Attribute::new()).immutable())
        .attribute("owners", Attribute::list(Attribute::new()).readonly())
        .build()
}

fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|item| Value::from(*item)).collect()
}

/// Sets `tags` on a fresh object and returns both, with notices cleared.
fn tagged(items: &[&str]) -> (std::rc::Rc<TestObject>, ListValue) {
    let object = TestObject::new(&schema(&file_type()));
    object.set("tags", strings(items)).unwrap();
    object.take_notices();

    let tags = object.get("tags").unwrap().as_list().unwrap().clone();
    (object, tags)
}

// ---- construction ----

#[test]
fn array_becomes_a_list() {
    let (object, tags) = tagged(&["a", "b"]);

    assert_eq!(tags.len(), 2);
    assert!(tags.is_owned_by(object.owner_id()));
    assert_eq!(tags, strings(&["a", "b"]));
    assert_eq!(object.get("tags").unwrap(), Value::Array(strings(&["a", "b"])));
}

#[test]
fn non_list_is_rejected() {
    let object = TestObject::new(&schema(&file_type()));
    let err = object.set("tags", "a").unwrap_err();
    assert!(err.is_attribute_validation());
    assert_eq!(
        err.to_string(),
        "Expected a list or ListAttribute for attribute tags"
    );
}

#[test]
fn list_passes_through_with_identity() {
    let (object, tags) = tagged(&["a"]);
    let other = TestObject::new(&schema(&file_type()));

    other.set("tags", &tags).unwrap();
    assert!(other.get("tags").unwrap().as_list().unwrap().ptr_eq(&tags));
    assert!(tags.is_owned_by(object.owner_id()));
    assert!(tags.is_owned_by(other.owner_id()));
}

#[test]
fn mapping_items_are_built_from_records() {
    let file = file_type();
    let object = TestObject::new(&schema(&file));
    object
        .set(
            "files",
            vec![record! { "href" => "gs://a" }, record! { "href" => "gs://b" }],
        )
        .unwrap();

    let files = object.get("files").unwrap();
    let files = files.as_list().unwrap();
    let first = files.get(0).unwrap();
    let first = first.as_mapping().unwrap();

    assert!(Arc::ptr_eq(first.ty(), &file));
    assert!(first.is_owned_by(files.id()));
    assert_eq!(files.to_json().unwrap(), json!([{"href": "gs://a"}, {"href": "gs://b"}]));
}

// ---- policy ----

#[test]
fn immutable_list_rejects_every_mutation() {
    let object = TestObject::new(&schema(&file_type()));
    object.set("fixed", strings(&["a"])).unwrap();
    let fixed = object.get("fixed").unwrap().as_list().unwrap().clone();

    let err = fixed.append("b").unwrap_err();
    assert!(err.is_attribute_validation());
    assert_eq!(
        err.to_string(),
        "Can't append 'fixed' item because it is an immutable attribute"
    );
    assert!(fixed.clear().is_err());
    assert!(fixed.reverse().is_err());
    assert_eq!(fixed, strings(&["a"]));
}

#[test]
fn readonly_list_rejects_every_mutation() {
    let object = TestObject::new(&schema(&file_type()));
    object.set_unvalidated("owners", strings(&["user:a"])).unwrap();
    let owners = object.get("owners").unwrap().as_list().unwrap().clone();

    let err = owners.pop().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can't pop 'owners' item because it is a readonly attribute"
    );
    assert_eq!(owners.len(), 1);
}

#[test]
fn vetoed_mutation_is_not_committed() {
    let (object, tags) = tagged(&["a"]);
    object.mark_deleted();

    assert!(tags.append("b").unwrap_err().is_deleted_object());
    assert_eq!(tags, strings(&["a"]));
}

// ---- mutators ----

#[test]
fn append_then_pop() {
    let (object, tags) = tagged(&["a"]);

    tags.append("b").unwrap();
    assert_eq!(tags.pop().unwrap(), Value::from("b"));
    assert_eq!(tags.len(), 1);
    assert_eq!(
        object.take_notices(),
        vec![notice("tags", true), notice("tags", true)]
    );
}

#[test]
fn popped_mapping_is_deregistered() {
    let file = file_type();
    let object = TestObject::new(&schema(&file));
    object.set("files", Vec::<Value>::new()).unwrap();
    let files = object.get("files").unwrap().as_list().unwrap().clone();

    files.append(record! { "href" => "gs://a" }).unwrap();
    let item = files.get(0).unwrap().as_mapping().unwrap().clone();
    assert!(item.is_owned_by(files.id()));

    let popped = files.pop().unwrap();
    assert!(popped.as_mapping().unwrap().ptr_eq(&item));
    assert!(!item.is_owned_by(files.id()));

    // Detached items no longer reach the object
    object.take_notices();
    item.set("href", "gs://b").unwrap();
    assert!(object.take_notices().is_empty());
}

#[test]
fn item_change_reaches_the_list_owner() {
    let file = file_type();
    let object = TestObject::new(&schema(&file));
    object
        .set("files", vec![record! { "href" => "gs://a" }])
        .unwrap();
    object.take_notices();

    let files = object.get("files").unwrap();
    let item = files.as_list().unwrap().get(0).unwrap();
    item.as_mapping().unwrap().set("href", "gs://b").unwrap();

    assert_eq!(object.take_notices(), vec![notice("files", true)]);
}

#[test]
fn pop_from_empty_list_is_an_index_error() {
    let (_object, tags) = tagged(&[]);
    let err = tags.pop().unwrap_err();
    assert!(err.is_index());
    assert_eq!(err.to_string(), "pop from empty list");
    assert!(tags.pop_at(3).unwrap_err().is_index());
}

#[test]
fn insert_and_index_of() {
    let (_object, tags) = tagged(&["a", "c"]);

    tags.insert(1, "b").unwrap();
    tags.insert(3, "d").unwrap();
    assert_eq!(tags, strings(&["a", "b", "c", "d"]));
    assert_eq!(tags.index_of("c").unwrap(), 2);
    assert!(tags.index_of("z").unwrap_err().is_index());
    assert!(tags.insert(9, "x").unwrap_err().is_index());
}

#[test]
fn remove_first_occurrence() {
    let (_object, tags) = tagged(&["a", "b", "a"]);

    tags.remove("a").unwrap();
    assert_eq!(tags, strings(&["b", "a"]));
    assert!(tags.remove("z").unwrap_err().is_index());
}

#[test]
fn reverse_reports_change_only_when_order_changes() {
    let (object, tags) = tagged(&[]);
    tags.reverse().unwrap();

    tags.append("a").unwrap();
    object.take_notices();
    tags.reverse().unwrap();
    assert_eq!(object.take_notices(), vec![notice("tags", false)]);

    tags.extend(["b", "c"]).unwrap();
    object.take_notices();
    tags.reverse().unwrap();
    assert_eq!(tags, strings(&["c", "b", "a"]));
    assert_eq!(object.take_notices(), vec![notice("tags", true)]);

    let (object, tags) = tagged(&["x", "x"]);
    tags.reverse().unwrap();
    assert_eq!(object.take_notices(), vec![notice("tags", false)]);
}

#[test]
fn sort_is_stable() {
    let (object, tags) = tagged(&["bb", "a", "cc", "d"]);

    tags.sort_by_key(|item| item.as_str().map(str::len)).unwrap();
    assert_eq!(tags, strings(&["a", "d", "bb", "cc"]));
    assert_eq!(object.take_notices(), vec![notice("tags", true)]);

    tags.sort_by_key(|item| item.as_str().map(str::len)).unwrap();
    assert_eq!(object.take_notices(), vec![notice("tags", false)]);

    tags.sort_by(|a, b| b.as_str().cmp(&a.as_str())).unwrap();
    assert_eq!(tags, strings(&["d", "cc", "bb", "a"]));
}

#[test]
fn clear_reports_change_only_when_non_empty() {
    let (object, tags) = tagged(&["a"]);

    tags.clear().unwrap();
    tags.clear().unwrap();
    assert!(tags.is_empty());
    assert_eq!(
        object.take_notices(),
        vec![notice("tags", true), notice("tags", false)]
    );
}

#[test]
fn set_and_splice() {
    let (object, tags) = tagged(&["a", "b", "c"]);

    tags.set(1, "b").unwrap();
    assert_eq!(object.take_notices(), vec![notice("tags", false)]);

    tags.set(1, "x").unwrap();
    assert_eq!(tags, strings(&["a", "x", "c"]));
    assert_eq!(object.take_notices(), vec![notice("tags", true)]);

    tags.splice(1..3, ["y"]).unwrap();
    assert_eq!(tags, strings(&["a", "y"]));

    tags.splice(1..2, ["y"]).unwrap();
    assert_eq!(
        object.take_notices(),
        vec![notice("tags", true), notice("tags", false)]
    );

    assert!(tags.set(5, "z").unwrap_err().is_index());
    assert!(tags.splice(1..5, ["z"]).unwrap_err().is_index());
}

#[test]
fn replaced_mapping_is_deregistered() {
    let file = file_type();
    let object = TestObject::new(&schema(&file));
    object
        .set("files", vec![record! { "href" => "gs://a" }])
        .unwrap();
    let files = object.get("files").unwrap().as_list().unwrap().clone();
    let old = files.get(0).unwrap().as_mapping().unwrap().clone();

    files.set(0, record! { "href" => "gs://b" }).unwrap();

    let new = files.get(0).unwrap().as_mapping().unwrap().clone();
    assert!(!old.is_owned_by(files.id()));
    assert!(new.is_owned_by(files.id()));
}

#[test]
fn delete_and_delete_range() {
    let (object, tags) = tagged(&["a", "b", "c", "d"]);

    tags.delete(0).unwrap();
    assert_eq!(tags, strings(&["b", "c", "d"]));

    tags.delete_range(1..).unwrap();
    assert_eq!(tags, strings(&["b"]));

    tags.delete_range(0..0).unwrap();
    assert_eq!(
        object.take_notices(),
        vec![notice("tags", true), notice("tags", true), notice("tags", false)]
    );
    assert!(tags.delete(4).unwrap_err().is_index());
}

#[test]
fn extend_assign_and_repeat_assign() {
    let (object, tags) = tagged(&["a"]);

    tags.extend_assign(Vec::<Value>::new()).unwrap();
    tags.extend_assign(["b"]).unwrap();
    assert_eq!(tags, strings(&["a", "b"]));

    tags.repeat_assign(1).unwrap();
    tags.repeat_assign(2).unwrap();
    assert_eq!(tags, strings(&["a", "b", "a", "b"]));

    assert_eq!(
        object.take_notices(),
        vec![
            notice("tags", false),
            notice("tags", true),
            notice("tags", false),
            notice("tags", true),
        ]
    );

    tags.repeat_assign(0).unwrap();
    assert!(tags.is_empty());
}

#[test]
fn oversized_repeat_is_an_index_error() {
    let (object, tags) = tagged(&["a", "b"]);

    let err = tags.repeat_assign(usize::MAX).unwrap_err();
    assert!(err.is_index());
    assert_eq!(
        err.to_string(),
        format!("cannot repeat list of length 2 {} times", usize::MAX)
    );
    assert!(tags.repeat(usize::MAX).unwrap_err().is_index());

    assert_eq!(tags, strings(&["a", "b"]));
    assert!(object.take_notices().is_empty());
}

#[test]
fn empty_list_repeats_to_empty() {
    let (object, tags) = tagged(&[]);

    tags.repeat_assign(usize::MAX).unwrap();
    assert!(tags.is_empty());
    assert_eq!(object.take_notices(), vec![notice("tags", false)]);
}

#[test]
fn range_ending_at_usize_max_is_an_index_error() {
    let (object, tags) = tagged(&["a", "b"]);

    assert!(tags.delete_range(0..=usize::MAX).unwrap_err().is_index());
    assert!(tags
        .delete_range((std::ops::Bound::Excluded(usize::MAX), std::ops::Bound::Unbounded))
        .unwrap_err()
        .is_index());
    assert!(tags.splice(1..=usize::MAX, ["z"]).unwrap_err().is_index());

    assert_eq!(tags, strings(&["a", "b"]));
    assert!(object.take_notices().is_empty());
}

// ---- item ownership ----

#[test]
fn vetoed_assignment_leaves_items_unowned() {
    let ty = file_type();
    let object = TestObject::new(&schema(&ty));
    let file = ty.instantiate([("href", "gs://a")], true).unwrap();
    object.mark_deleted();

    let err = object.set("files", vec![Value::from(&file)]).unwrap_err();
    assert!(err.is_deleted_object());
    assert!(!object.contains("files"));
    assert_eq!(file.owner_count(), 0);
}

#[test]
fn reassignment_keeps_a_single_list_owner() {
    let ty = file_type();
    let object = TestObject::new(&schema(&ty));
    let file = ty.instantiate([("href", "gs://a")], true).unwrap();

    for _ in 0..100 {
        object.set("files", vec![Value::from(&file)]).unwrap();
    }
    assert_eq!(file.owner_count(), 1);

    let files = object.get("files").unwrap().as_list().unwrap().clone();
    assert!(file.is_owned_by(files.id()));

    // Only the current list reports item changes
    object.take_notices();
    file.set("href", "gs://b").unwrap();
    assert_eq!(object.take_notices(), vec![notice("files", true)]);
}

#[test]
fn unset_list_releases_its_items() {
    let ty = file_type();
    let object = TestObject::new(&schema(&ty));
    let file = ty.instantiate([("href", "gs://a")], true).unwrap();

    object.set("files", vec![Value::from(&file)]).unwrap();
    object.unset("files").unwrap();
    assert_eq!(file.owner_count(), 0);
}

#[test]
fn dropped_list_releases_shared_items() {
    let ty = file_type();
    let file = ty.instantiate([("href", "gs://a")], true).unwrap();

    let first = ListValue::from_items(Attribute::mapping(&ty), [&file], true).unwrap();
    let second = ListValue::from_items(Attribute::mapping(&ty), [&file, &file], true).unwrap();
    assert_eq!(file.owner_count(), 2);
    assert!(file.is_owned_by(first.id()));

    drop(first);
    assert_eq!(file.owner_count(), 1);
    assert!(file.is_owned_by(second.id()));

    drop(second);
    assert_eq!(file.owner_count(), 0);
}

#[test]
fn nested_list_binds_when_committed() {
    let object = TestObject::new(
        &Schema::builder("grid")
            .attribute("rows", Attribute::list(Attribute::list(Attribute::new())))
            .build(),
    );
    object
        .set("rows", vec![Value::Array(strings(&["a", "b"]))])
        .unwrap();
    object.take_notices();

    let rows = object.get("rows").unwrap().as_list().unwrap().clone();
    let row = rows.get(0).unwrap().as_list().unwrap().clone();
    assert!(row.is_owned_by(rows.id()));

    row.append("c").unwrap();
    assert_eq!(object.take_notices(), vec![notice("rows", true)]);
}

// ---- read-only operations ----

#[test]
fn membership_and_counting() {
    let (_object, tags) = tagged(&["a", "b", "a"]);

    assert!(tags.contains("a"));
    assert!(!tags.contains("z"));
    assert_eq!(tags.count("a"), 2);
    assert_eq!(tags.iter().count(), 3);
}

#[test]
fn concat_and_repeat_do_not_modify() {
    let (object, tags) = tagged(&["a"]);

    assert_eq!(tags.concat(["b"]).unwrap(), strings(&["a", "b"]));
    assert_eq!(tags.repeat(3).unwrap(), strings(&["a", "a", "a"]));
    assert_eq!(tags.to_vec(), strings(&["a"]));
    assert!(object.take_notices().is_empty());
}

#[test]
fn concat_does_not_register_new_items() {
    let file = file_type();
    let object = TestObject::new(&schema(&file));
    object.set("files", Vec::<Value>::new()).unwrap();
    let files = object.get("files").unwrap().as_list().unwrap().clone();

    let joined = files.concat([record! { "href" => "gs://a" }]).unwrap();
    assert_eq!(joined[0].as_mapping().unwrap().owner_count(), 0);
}

#[test]
fn equality_with_lists_and_plain_sequences() {
    let a = ListValue::from_items(Attribute::new(), ["x", "y"], true).unwrap();
    let b = ListValue::from_items(Attribute::new(), ["x", "y"], true).unwrap();
    let c = ListValue::from_items(Attribute::new(), ["y", "x"], true).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, strings(&["x", "y"]));
    assert_ne!(Value::from(a), Value::from("x"));
}

#[test]
fn standalone_list_can_be_assigned() {
    let list = ListValue::new(Attribute::new());
    list.append("a").unwrap();

    let object = TestObject::new(&schema(&file_type()));
    object.set("tags", &list).unwrap();
    object.take_notices();

    list.append("b").unwrap();
    assert_eq!(object.take_notices(), vec![notice("tags", true)]);
}
