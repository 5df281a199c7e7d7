use base64::{prelude::BASE64_STANDARD as BASE_64, Engine as _};

use aegis_srp::{
    bcrypt_hash, hash_password, mailbox_password_hash, SrpError, SrpVersion, EXPAND_HASH_LEN,
};

const TEST_MODULUS: &str = "W2z5HBi8RvsfYzZTS7qBaUxxPhsfHJFZpu3Kd6s1JafNrCCH9rfvPLrfuqocxWPgWDH2R8neK7PkNvjxto9TStuY5z7jAzWRvFWN9cQhAKkdWgy0JY6ywVn22+HFpF4cYesHrqFIKUPDMSSIlWjBVmEJZ/MusD44ZT29xcPrOqeZvwtCffKtGAIjLYPZIEbZKnDM1Dm3q2K/xS5h+xdhjnndhsrkwm9U9oyA2wxzSXFL+pdfj2fOdRwuR5nW0J2NFrq3kJjkRmpO/Genq1UW+TEknIWAb6VzJJJA244K/H8cnSx2+nSNZO3bbo6Ys228ruV9A8m6DhxmS+bihN3ttQ==";

fn test_modulus() -> Vec<u8> {
    BASE_64.decode(TEST_MODULUS).unwrap()
}

fn assert_bcrypt_vector(encoded_salt: &str, expected: &str) {
    let hash = bcrypt_hash("test!!!", encoded_salt).unwrap();
    assert_eq!(hash.as_bytes(), expected.as_bytes());
}

#[test]
fn bcrypt_vectors() {
    assert_bcrypt_vector(
        "PTTsDBs/mlLnSk6VmtFghe",
        "$2y$10$PTTsDBs/mlLnSk6VmtFgheNSiK/lSwtJsrBLLDK3kZYI7193nInqy",
    );
    assert_bcrypt_vector(
        "4DZHd6WZX4fEaWKtCfYdde",
        "$2y$10$4DZHd6WZX4fEaWKtCfYddeZfcryISo9eEMgbA90O.Wnnz1s1VKmKC",
    );
    assert_bcrypt_vector(
        "RpyeXO7K2eD3r/ZZ/B63V.",
        "$2y$10$RpyeXO7K2eD3r/ZZ/B63V.Tya53OExbyO8LR7TB93KYP4PvC.EPMW",
    );
    assert_bcrypt_vector(
        "/.3KXCwRnsrxURMGxN7.R.",
        "$2y$10$/.3KXCwRnsrxURMGxN7.R.GLpVq0zyBbI9wgS0wB2U/g2btx1RYoy",
    );
}

fn assert_mailbox_vector(password: &str, b64_salt: &str, expected: &str) {
    let salt = BASE_64.decode(b64_salt).unwrap();
    let hash = mailbox_password_hash(password, &salt).unwrap();
    assert_eq!(hash.as_bytes(), expected.as_bytes());
}

#[test]
fn mailbox_password_vectors() {
    assert_mailbox_vector(
        "password",
        "imK9IHsRcA2Zsv+yROZgbw==",
        "$2y$10$gkI7GFqPa.0Xqt8wPMXeZuQ.Gd9rSsqE0xQ8Qcf0Q9ckInb4hIzOu",
    );
    assert_mailbox_vector(
        "a loooong password~~~?\n\n",
        "6hGAnuIZ7Dgf3f/diExc6A==",
        "$2y$10$4fE.lsGX5Bed1d9bgCva4.5x5DgJBFXMNlS93R3YxYVVxR7Jq8V3q",
    );
    assert_mailbox_vector(
        "t",
        "rNBLbNt14Nuo9lzr6/QpVg==",
        "$2y$10$pL/JZLrz2Lsm7jxp49OnTeQSN9nb4NyO/HCMNYgPTztxZHDF9XRVO",
    );
}

fn assert_v4_vector(password: &str, b64_salt: &str, b64_expected: &str) {
    let salt = BASE_64.decode(b64_salt).unwrap();
    let expected = BASE_64.decode(b64_expected).unwrap();
    let hash = hash_password(SrpVersion::V4, None, password, &salt, &test_modulus()).unwrap();
    assert_eq!(hash.as_bytes(), expected);
}

#[test]
fn version_four_vectors() {
    assert_v4_vector(
        "password",
        "nlPyLLmzfxbmpg==",
        "1DaNzc9NfToyuSmOBiFVRAofhDKKvA82jqqDJV152Qme+7DArz/gQLdTPGGOHIGqeIl1YY2Leo69J4ED6a+qGwuuxgugfsjs3ACC3YNDocU9/b2/nnCDwHbp0ygNbKe/2sL5e1NE5WApxzsQNqBLmLccrOJ9ci6FUcTWvaSwTkC/wdNWaQEIMx5FIo9b1lnkU5sJPYyOqVoz6cYAGjrAkIzRaJ9u6vD58H7DntIpLRCdg0PBEcYcRwSO6x/oqJhqZw+OibqmX/bLngAJ/gm4O3arAqPy9L4OHdNR3hdhrNOj5iWKRIy/m4UYYMTO/wPzD2EqaZZP8tvOSpR9DBPwFQ==",
    );
    assert_v4_vector(
        "complex password~~????;&&++",
        "deDPBSWDYz990Q==",
        "uzT+PZQD99hBTXdJC6pUgLlRWsOOMSc152mKk9V/TcTYVawoI4sMDxOiFsWusys7l0E/r/i3k8lX2TNYFJ5o3sQfAzMXbnPNeyS1VxzY5nzmkmeu9YgEdH8vwGoxsMy/XD4zyfwP7hQGjOWH4UUYrqgg6sMv4EgnwImCI6XUyJ9Z28JHU4TCUbLF8TIolsVXX2xFBb0blguqf3w2ETbxkKpr2GZQvJD5VXhsptaO7FC/MbA5cvV+2gP8PZGThYXob0wmjCBasEnv5da3ZlUL2h7aX7UDilxQVP6jN4+xTPjKg5tymsdiXZl5/pAr9tHKDiH6mZCJ+CbfXA7wxDSk0Q==",
    );
    assert_v4_vector(
        "t",
        "2PAWF2sAwezq0w==",
        "ickwfLUx8qW2yrt7KUAkRFD/DMKDlZatiDtSc31VaDE07gsImWJs9i7XOGXAKh10FLgYijj+kH3mVZGXpGWDKnfDEWvXtR0K73gdKhPSdVAZ3e4wMqGbjkUhePFdjNEg65NixWYbc4lmLoGYjAkm2hPAlD9X4zvLS7qCmHlJsJcF2qsbwZ+TFz5BIFJr51Kb5vPyJ1j4YmyDW0hSiRe2ZwE1qCwsERIKaebkugecpp4wnceJfvjNDe2e8sKILRUJjhgYtK8nI/XplaMTWdtIE/z0YM6b9rfb3X0r91czidbhE3cCeNw6WLU2dCN0/MRRRs62i9ko3bB14Bp6cCzykw==",
    );
}

#[test]
fn hashing_is_deterministic_and_full_width() {
    let salt = [3_u8; 10];
    let first = hash_password(SrpVersion::V4, None, "secret", &salt, &test_modulus()).unwrap();
    let second = hash_password(SrpVersion::V4, None, "secret", &salt, &test_modulus()).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.len(), EXPAND_HASH_LEN);
}

#[test]
fn version_zero_prehashes_the_password() {
    use sha2::{Digest as _, Sha512};

    let modulus = test_modulus();
    let via_version_zero =
        hash_password(SrpVersion::V0, Some("alice"), "hunter2", &[], &modulus).unwrap();

    let prehashed = BASE_64.encode(Sha512::digest("hunter2".as_bytes()));
    let via_version_one =
        hash_password(SrpVersion::V1, Some("alice"), &prehashed, &[], &modulus).unwrap();

    assert_eq!(via_version_zero.as_bytes(), via_version_one.as_bytes());
}

#[test]
fn version_two_cleans_the_username() {
    let modulus = test_modulus();
    let cleaned =
        hash_password(SrpVersion::V2, Some("A-li_c.e"), "hunter2", &[], &modulus).unwrap();
    let plain = hash_password(SrpVersion::V1, Some("alice"), "hunter2", &[], &modulus).unwrap();
    assert_eq!(cleaned.as_bytes(), plain.as_bytes());
}

#[test]
fn legacy_versions_require_a_username() {
    let result = hash_password(SrpVersion::V1, None, "hunter2", &[], &test_modulus());
    assert!(matches!(result, Err(SrpError::MissingUsername(1))));
}

#[test]
fn salt_window_is_enforced() {
    let result = hash_password(SrpVersion::V4, None, "pw", &[0_u8; 5], &test_modulus());
    assert!(matches!(result, Err(SrpError::InvalidInput(_))));

    let result = hash_password(SrpVersion::V4, None, "pw", &[0_u8; 17], &test_modulus());
    assert!(matches!(result, Err(SrpError::InvalidInput(_))));
}

#[test]
fn modulus_width_is_enforced() {
    let result = hash_password(SrpVersion::V4, None, "pw", &[0_u8; 10], &[0_u8; 255]);
    assert!(matches!(result, Err(SrpError::InvalidInput(_))));
}

#[test]
fn unknown_versions_are_unsupported() {
    assert!(matches!(
        SrpVersion::try_from(5),
        Err(SrpError::UnsupportedVersion)
    ));
}
