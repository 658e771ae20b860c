//! Tests for the account model.

use super::*;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn citizen_draft() -> UserDraft {
    UserDraft {
        id: UserId::new(VALID_ID).expect("fixture id"),
        full_name: FullName::new("Sita Sharma").expect("fixture name"),
        email: Email::new("sita@example.com").expect("fixture email"),
        role: Role::User,
        verified: false,
        municipality: None,
        ward: None,
        phone: None,
        profile_picture: None,
        citizenship_document: None,
        created_at: Utc::now(),
    }
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn user_id_serialises_as_string() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let value = serde_json::to_value(&id).expect("serialise");
    assert_eq!(value, serde_json::json!(VALID_ID));
}

#[rstest]
#[case("  Sita@Example.COM ", "sita@example.com")]
#[case("ram.bahadur@mail.gov.np", "ram.bahadur@mail.gov.np")]
fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(Email::new(raw).expect("valid email").as_ref(), expected);
}

#[rstest]
#[case("")]
#[case("no-at-sign")]
#[case("two@@example.com")]
#[case("spaces in@example.com")]
#[case("missing@tld")]
fn email_rejects_malformed_addresses(#[case] raw: &str) {
    assert_eq!(
        Email::new(raw).expect_err("invalid email"),
        UserValidationError::InvalidEmail
    );
}

#[rstest]
fn full_name_rejects_blank_and_long_values() {
    assert_eq!(
        FullName::new("   ").expect_err("blank"),
        UserValidationError::EmptyFullName
    );
    let long = "a".repeat(FULL_NAME_MAX + 1);
    assert_eq!(
        FullName::new(long).expect_err("too long"),
        UserValidationError::FullNameTooLong { max: FULL_NAME_MAX }
    );
}

#[rstest]
#[case(None, Ok(None))]
#[case(Some("  "), Ok(None))]
#[case(Some("+977 9800000000"), Ok(Some("+977 9800000000".to_owned())))]
#[case(Some("12345"), Err(UserValidationError::InvalidPhone))]
#[case(Some("98000abc00"), Err(UserValidationError::InvalidPhone))]
fn phone_validation(
    #[case] raw: Option<&str>,
    #[case] expected: Result<Option<String>, UserValidationError>,
) {
    assert_eq!(validate_phone(raw), expected);
}

#[rstest]
#[case("user", Role::User)]
#[case("MUNICIPALITY", Role::Municipality)]
#[case(" Admin ", Role::Admin)]
fn role_parses_case_insensitively(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>().expect("known role"), expected);
}

#[rstest]
fn staff_roles() {
    assert!(!Role::User.is_staff());
    assert!(Role::Municipality.is_staff());
    assert!(Role::Admin.is_staff());
}

#[given("a municipality account without a ward")]
fn municipality_without_ward(citizen_draft: UserDraft) -> UserDraft {
    UserDraft {
        role: Role::Municipality,
        municipality: Some("Kathmandu".to_owned()),
        ward: Some("   ".to_owned()),
        ..citizen_draft
    }
}

#[when("the account is built")]
fn the_account_is_built(draft: UserDraft) -> Result<User, UserValidationError> {
    User::new(draft)
}

#[then("the jurisdiction is reported missing")]
fn jurisdiction_missing(result: Result<User, UserValidationError>) {
    assert_eq!(
        result.expect_err("jurisdiction required"),
        UserValidationError::MissingJurisdiction
    );
}

#[rstest]
fn municipality_accounts_require_a_ward(citizen_draft: UserDraft) {
    let draft = municipality_without_ward(citizen_draft);
    let result = the_account_is_built(draft);
    jurisdiction_missing(result);
}

#[rstest]
fn profile_update_only_touches_given_fields(citizen_draft: UserDraft) {
    let user = User::new(citizen_draft).expect("valid user");
    let update = ProfileUpdate {
        phone: Some("9800000000".to_owned()),
        ..ProfileUpdate::default()
    };

    let updated = user.clone().apply(&update);

    assert_eq!(updated.phone(), Some("9800000000"));
    assert_eq!(updated.full_name(), user.full_name());
    assert_eq!(updated.email(), user.email());
}

#[rstest]
fn verified_sets_flag(citizen_draft: UserDraft) {
    let user = User::new(citizen_draft).expect("valid user");
    assert!(!user.is_verified());
    assert!(user.verified().is_verified());
}
