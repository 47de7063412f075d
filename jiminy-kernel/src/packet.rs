//! Codec du protocole texte échangé sur le bus MQTT.
//!
//! Un paquet valide est `<COMMANDE>` ou `<COMMANDE|ARG1|ARG2|...>`.
//! Tout ce qui n'est pas encadré par `<` et `>` est décodé en commande vide,
//! sans erreur : le protocole est best-effort, l'appelant ignore ce qu'il ne
//! reconnaît pas.

/// Décode un paquet en (commande, arguments dans l'ordre).
/// Aucune validation du nombre ou du contenu des arguments ici.
pub fn decode(raw: &str) -> (String, Vec<String>) {
    let Some(body) = raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) else {
        return (String::new(), Vec::new());
    };

    let mut parts = body.split('|').map(str::to_string);
    let cmd = parts.next().unwrap_or_default();
    (cmd, parts.collect())
}

/// Encode une commande et ses arguments au format paquet.
pub fn encode(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        format!("<{cmd}>")
    } else {
        format!("<{}|{}>", cmd, args.join("|"))
    }
}
