//! Runs a complete SRP exchange between an in-process client and server.
use base64::{prelude::BASE64_STANDARD as BASE_64, Engine as _};

use aegis_srp::{SrpAuth, SrpServer, SrpVerifierB64, SRP_BIT_LENGTH};

const SIGNED_MODULUS: &str = "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\nW2z5HBi8RvsfYzZTS7qBaUxxPhsfHJFZpu3Kd6s1JafNrCCH9rfvPLrfuqocxWPgWDH2R8neK7PkNvjxto9TStuY5z7jAzWRvFWN9cQhAKkdWgy0JY6ywVn22+HFpF4cYesHrqFIKUPDMSSIlWjBVmEJZ/MusD44ZT29xcPrOqeZvwtCffKtGAIjLYPZIEbZKnDM1Dm3q2K/xS5h+xdhjnndhsrkwm9U9oyA2wxzSXFL+pdfj2fOdRwuR5nW0J2NFrq3kJjkRmpO/Genq1UW+TEknIWAb6VzJJJA244K/H8cnSx2+nSNZO3bbo6Ys228ruV9A8m6DhxmS+bihN3ttQ==\n-----BEGIN PGP SIGNATURE-----\nVersion: ProtonMail\nComment: https://protonmail.com\n\nwl4EARYIABAFAlwB1j0JEDUFhcTpUY8mAAD8CgEAnsFnF4cF0uSHKkXa1GIa\nGO86yMV4zDZEZcDSJo0fgr8A/AlupGN9EdHlsrZLmTA1vhIx+rOgxdEff28N\nkvNM7qIK\n=q6vu\n-----END PGP SIGNATURE-----";

fn main() {
    let password = "correct horse battery staple";

    // Registration: the client enrolls a salt and verifier with the server.
    let record = SrpAuth::generate_verifier_record(
        &aegis_srp::PgpModulusVerifier::default(),
        password,
        None,
        SIGNED_MODULUS,
    )
    .expect("verifier generation failed");
    let record_b64 = SrpVerifierB64::from(&record);

    // Login, server side: issue the challenge for the stored verifier.
    let mut server =
        SrpServer::from_signed_with_pgp(SIGNED_MODULUS, &record.verifier, SRP_BIT_LENGTH)
            .expect("server creation failed");
    let challenge = server.generate_challenge();

    // Login, client side: derive the proofs from the password.
    let client = SrpAuth::with_pgp(
        record.version,
        None,
        password,
        &record_b64.salt,
        SIGNED_MODULUS,
        &BASE_64.encode(challenge),
    )
    .expect("client auth failed");
    let proofs = client
        .generate_proofs(SRP_BIT_LENGTH)
        .expect("proof generation failed");

    // Server checks the client proof, client checks the server proof.
    let server_proof = server
        .verify_proofs(&proofs.client_ephemeral, &proofs.client_proof)
        .expect("server rejected the client proof");
    assert!(proofs.compare_server_proof(&server_proof));

    println!(
        "authenticated; shared session established: {}",
        server.is_completed()
    );
}
