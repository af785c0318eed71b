mod test_utils;

use rental_backend::{
    entities::property::UpdatePropertyRequest,
    errors::AppError,
    use_cases::property::PropertyHandler,
};
use test_utils::*;
use uuid::Uuid;

/// Repository holding one listing that applies the price and title of an edit.
fn editable_repo(property_id: Uuid, owner: Uuid) -> MockPropertyRepo {
    let mut repo = property_repo_returning(property(property_id, owner));
    repo.expect_update_property()
        .times(1)
        .returning(move |id, changes| {
            let mut updated = property(*id, owner);
            if let Some(price) = changes.price {
                updated.price = price;
            }
            if let Some(title) = &changes.title {
                updated.title = title.clone();
            }
            Ok(updated)
        });
    repo
}

fn price_change(price: f64) -> UpdatePropertyRequest {
    UpdatePropertyRequest { price: Some(price), ..Default::default() }
}

#[tokio::test]
async fn owner_edits_only_the_fields_sent() {
    let property_id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let handler = PropertyHandler::new(editable_repo(property_id, owner), MockImageRepo::new());

    let request = UpdatePropertyRequest {
        title: Some("  Maison avec jardin  ".into()),
        price: Some(1100.0),
        ..Default::default()
    };
    let updated = handler
        .update_property(&actor(owner), &property_id.to_string(), request)
        .await
        .unwrap();

    assert_eq!(updated.title, "Maison avec jardin");
    assert_eq!(updated.price, 1100.0);
    assert_eq!(updated.city, "Port-au-Prince");
}

#[tokio::test]
async fn admins_may_edit_any_listing() {
    let property_id = Uuid::new_v4();
    let handler = PropertyHandler::new(editable_repo(property_id, Uuid::new_v4()), MockImageRepo::new());

    let updated = handler
        .update_property(&admin(), &property_id.to_string(), price_change(700.0))
        .await
        .unwrap();

    assert_eq!(updated.price, 700.0);
}

#[tokio::test]
async fn strangers_cannot_edit_a_listing() {
    let property_id = Uuid::new_v4();
    let mut repo = property_repo_returning(property(property_id, Uuid::new_v4()));
    repo.expect_update_property().never();
    let handler = PropertyHandler::new(repo, MockImageRepo::new());

    let result = handler
        .update_property(&actor(Uuid::new_v4()), &property_id.to_string(), price_change(1.0))
        .await;

    assert!(matches!(result, Err(AppError::ForbiddenAccess)));
}

#[tokio::test]
async fn empty_or_invalid_edits_never_reach_storage() {
    let property_id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let mut repo = MockPropertyRepo::new();
    repo.expect_get_property().never();
    repo.expect_update_property().never();
    let handler = PropertyHandler::new(repo, MockImageRepo::new());

    let empty = handler
        .update_property(&actor(owner), &property_id.to_string(), UpdatePropertyRequest::default())
        .await;
    let negative_price = handler
        .update_property(&actor(owner), &property_id.to_string(), price_change(-5.0))
        .await;
    let bad_id = handler
        .update_property(&actor(owner), "not-a-uuid", price_change(500.0))
        .await;

    assert!(matches!(empty, Err(AppError::ValidationError(_))));
    assert!(matches!(negative_price, Err(AppError::ValidationError(_))));
    assert!(matches!(bad_id, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn editing_a_missing_listing_is_not_found() {
    let mut repo = MockPropertyRepo::new();
    repo.expect_get_property().returning(|_| Ok(None));
    repo.expect_update_property().never();
    let handler = PropertyHandler::new(repo, MockImageRepo::new());

    let result = handler
        .update_property(&admin(), &Uuid::new_v4().to_string(), price_change(500.0))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
