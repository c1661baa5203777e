mod support;
use support::*;

use geocat::{catalog_object_schema, Attribute, Catalog, CatalogType, Schema};

use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn registered_types_are_resolved_by_name() {
    let client = MemoryClient::new();
    let catalog = catalog(&client);

    assert_eq!(
        catalog.types().map(|ty| ty.name()).collect::<Vec<_>>(),
        ["product", "band"]
    );
    assert_eq!(catalog.ty("band").unwrap().name(), "band");

    let err = catalog.create("image").unwrap_err();
    assert!(err.is_attribute_access());
    assert_eq!(err.to_string(), "no catalog type named image");
}

#[test]
fn duplicate_type_names_are_rejected() {
    let err = Catalog::builder()
        .register(product_type())
        .register(product_type())
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
    assert_eq!(
        err.to_string(),
        "invalid schema: catalog type `product` is registered more than once"
    );
}

#[test]
fn reference_without_id_attribute_is_rejected() {
    let product = product_type();
    let schema = Schema::builder("band")
        .attribute("product", Attribute::reference(product))
        .build();

    let err = CatalogType::new(schema).unwrap_err();
    assert!(err.is_invalid_schema());
    assert_eq!(
        err.to_string(),
        "invalid schema: band: reference attribute `product` has no `product_id` attribute"
    );
}

#[test]
fn get_unknown_id() {
    let client = MemoryClient::new();
    let catalog = catalog(&client);

    let err = catalog.get("product", "nope").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "product 'nope' not found");
}

#[test]
fn get_needs_a_client() {
    let catalog = Catalog::builder().register(product_type()).build().unwrap();

    assert!(catalog.client().is_none());
    let err = catalog.get("product", "p1").unwrap_err();
    assert_eq!(err.to_string(), "cannot get product 'p1' without a client");
}

#[test]
fn created_objects_share_the_client() {
    let client = MemoryClient::new();
    let catalog = catalog(&client);

    let product = catalog.create("product").unwrap();
    product.set("name", "Landsat 8").unwrap();
    product.save().unwrap();

    assert_eq!(
        client.stored("product", "product-1").unwrap()["name"],
        json!("Landsat 8")
    );
}

#[test]
fn base_schema() {
    let schema = catalog_object_schema();

    assert_eq!(
        schema.attributes().collect::<Vec<_>>(),
        [
            "id",
            "created",
            "modified",
            "owners",
            "readers",
            "writers",
            "tags",
            "extra_properties"
        ]
    );

    let id = schema.attribute_type("id").unwrap();
    assert!(!id.is_mutable());
    assert!(!id.is_serializable());

    for name in ["created", "modified"] {
        let attribute = schema.attribute_type(name).unwrap();
        assert!(attribute.is_readonly());
        assert!(attribute.ty().is_timestamp());
    }

    for name in ["owners", "readers", "writers", "tags"] {
        assert!(schema.attribute_type(name).unwrap().ty().is_list());
    }
}

#[test]
fn concrete_types_inherit_the_base_schema() {
    let product = product_type();
    let schema = product.schema();

    assert!(schema.contains("tags"));
    assert_eq!(
        schema.attributes().take(4).collect::<Vec<_>>(),
        ["name", "description", "start_datetime", "resolution"]
    );
}
