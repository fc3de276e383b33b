//! Prompts sent to the AI collaborators.
//!
//! Templates are `const` strings with `{placeholder}` markers substituted by
//! the `format_*` helpers. The prompts are French: they address French
//! property statements ("relevés de propriété") and the product surface is
//! French throughout.

use serde::Serialize;

use crate::types::lot::{ConsolidatedLot, Owner};

/// Extraction prompt. `{file_name}` and `{section}` are substituted.
pub const EXTRACTION_PROMPT: &str = r#"Tu es un expert en analyse de documents cadastraux français.
FICHIER: {file_name}
SECTION RECHERCHEE: {section}

INSTRUCTIONS GENERALES:
1. Le document est un relevé de propriété, soit un PDF, soit du code source HTML.
2. Si c'est du HTML, interprète le contenu textuel comme s'il était affiché, en utilisant les balises <table>, <tr>, <td> pour comprendre la structure.

3. **Identification des Propriétaires (Étape Cruciale)**:
   a. Scanne attentivement TOUTE la partie supérieure du document (l'en-tête, avant les tableaux) pour trouver les informations sur les propriétaires.
   b. Cherche des libellés comme "Propriétaire/Indivision". L'adresse est souvent juste en dessous.
   c. Cherche également des noms de personnes qui peuvent être listés séparément, parfois à côté de codes (ex: MCXTC6) ou dans d'autres colonnes de l'en-tête.
   d. **Combine les informations**: L'objectif est de créer une liste complète de propriétaires. S'il y a une seule adresse pour plusieurs noms (cas d'une indivision), attribue cette même adresse à chaque nom. Par exemple, si tu trouves "Propriétaire/Indivision" avec "9 AV MAURICE RAVEL..." en dessous, ET que tu trouves les noms "GALLOT/MICHEL..." et "GALLOT/ANDRÉ" dans la même zone, tu dois créer DEUX propriétaires, chacun avec l'adresse "9 AV MAURICE RAVEL...".

4. Ensuite, trouve les tables de "PROPRIÉTÉS BATTES" et "PROPRIÉTÉS NON BATTIES".
5. Dans ces tables, cherche TOUTES les lignes où la section correspond à "{section}".
6. Pour chaque ligne correspondante, extrais les champs suivants:
   - "Les propriétaires (nom + adresse complète)": **Utilise la liste COMPLÈTE des propriétaires identifiés à l'étape 3** et associe-les à ce lot. La structure doit être un tableau d'objets avec "nomComplet" et "adresse".
   - "La section (Sec)": La section alphabétique (ex: CR).
   - "Le numéro de plan (N° Plan)": Le numéro de parcelle (ex: 282).
   - "Le numéro de lot": Le numéro de lot. S'il n'est pas explicite, cherche un identifiant comme "N°PORTE" ou "N°INVAR". Si aucun n'est trouvé, laisse ce champ vide.
   - "La quote-part (C Part)": La quote-part ou contenance (ex: "HA A CA 3 36").

FORMAT DE SORTIE ATTENDU:
Réponds OBLIGATOIREMENT et UNIQUEMENT avec un tableau JSON valide (commençant par '[' et finissant par ']'). N'ajoute aucun commentaire ou texte en dehors du JSON.
DOCUMENT:"#;

/// Synthesis prompt. `{data}` is substituted with the simplified lot list as
/// pretty-printed JSON.
pub const SYNTHESIS_PROMPT: &str = r#"Analyse ces données immobilières et fournis une synthèse concise et structurée en français. Utilise des listes à puces pour la clarté.

1.  **Résumé Général**: Donne le nombre total de lots uniques et le nombre de groupes de propriétaires distincts.
2.  **Répartition par Propriétaire**: Liste les groupes de propriétaires les plus fréquents et le nombre de lots qu'ils détiennent.
3.  **Observations Clés**: Fais des observations sur les quotes-parts (ex: lots détenus en pleine propriété, en indivision, etc.) et sur les adresses.
4.  **Conclusion**: Fournis une brève conclusion sur la structure de propriété.

Données: {data}"#;

/// The trimmed-down lot view sent to the synthesis collaborator: only the
/// fields the report needs, nothing display-specific.
#[derive(Debug, Serialize)]
struct SimplifiedLot<'a> {
    lot: &'a str,
    proprietaires: &'a [Owner],
    section: &'a str,
    plan: &'a str,
    #[serde(rename = "quoteParts")]
    quote_parts: &'a [String],
}

/// Build the extraction prompt for one document.
pub fn format_extraction_prompt(file_name: &str, section: &str) -> String {
    EXTRACTION_PROMPT
        .replace("{file_name}", file_name)
        .replace("{section}", section)
}

/// Build the synthesis prompt over the consolidated lot list.
pub fn format_synthesis_prompt(lots: &[ConsolidatedLot]) -> String {
    let simplified: Vec<SimplifiedLot> = lots
        .iter()
        .map(|lot| SimplifiedLot {
            lot: &lot.lot,
            proprietaires: &lot.owners,
            section: &lot.section,
            plan: &lot.plan,
            quote_parts: &lot.quote_parts,
        })
        .collect();

    let data = serde_json::to_string_pretty(&simplified).unwrap_or_else(|_| "[]".to_string());
    SYNTHESIS_PROMPT.replace("{data}", &data)
}
