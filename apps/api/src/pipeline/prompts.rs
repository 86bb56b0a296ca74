// All LLM prompts for the formalization pipeline.
// Each builder takes the original informal report and/or the rendered context.

use crate::models::report::PLACEHOLDER;

/// The fixed template the final step must fill in.
pub const FINAL_REPORT_TEMPLATE: &str = "
VORFALLBERICHT

Fallnummer: [ID]
Datum/Uhrzeit: [TT.MM.JJJJ, HH:MM]
Ort: [Block, Zelle, Hof, etc.]
Meldender Beamter: [Name, Dienstgrad]

Beteiligte Person(en):
- Häftling(e): [Namen, IDs]
- Beamte(r): [Namen]

Art des Vorfalls: [Verbale Aggression / Selbstverletzung / Sachbeschädigung / etc.]

Beschreibung:
[Hier die chronologische Beschreibung einfügen]

Ergriffene Maßnahmen:
[Hier die ergriffenen Maßnahmen einfügen]

Verletzungen/Schäden:
[Auflistung von Verletzungen oder Sachschäden, falls vorhanden.]

Beweismittel:
[Dateien, Bilder von Waffen, Blutergüssen, etc.]

Folgen:
[Ärztliche Untersuchung, Disziplinarverfahren, etc.]

Unterschrift: _______________________
";

pub fn extract_core_facts(report: &str) -> String {
    format!(
        "Extrahiere aus dem folgenden Bericht die Kerninformationen: Beteiligte Personen \
        (Häftlinge, Beamte), Ort des Vorfalls, Datum und Uhrzeit. Gib nur diese \
        Informationen kurz und prägnant wieder. Bericht: \"{report}\""
    )
}

pub fn chronology(report: &str, context: &str) -> String {
    format!(
        "Basierend auf dem Bericht, erstelle eine neutrale, chronologische Beschreibung der \
        Ereignisse in der Vergangenheitsform. Bisherige Erkenntnisse:\n{context}\n\n\
        Originalbericht: \"{report}\""
    )
}

pub fn measures_and_consequences(report: &str, context: &str) -> String {
    format!(
        "Identifiziere die ergriffenen Maßnahmen der Beamten, sowie eventuelle Verletzungen \
        oder Sachschäden. Bisherige Erkenntnisse:\n{context}\n\nOriginalbericht: \"{report}\""
    )
}

pub fn follow_up(report: &str, context: &str) -> String {
    format!(
        "Bestimme auf Basis der bisherigen Informationen die notwendigen Folgemaßnahmen \
        (z.B. Disziplinarverfahren, ärztliche Versorgung). Bisherige Erkenntnisse:\n\
        {context}\n\nOriginalbericht: \"{report}\""
    )
}

/// The final step sees only the accumulated context, never the raw report.
pub fn final_assembly(context: &str) -> String {
    format!(
        "Sie sind ein Experte für das Verfassen von formellen Vorfallberichten im deutschen \
        Justizvollzug. Füllen Sie die folgende Vorlage exakt aus. Nutzen Sie dafür \
        AUSSCHLIESSLICH die zusammengefassten Informationen. Erfinden Sie keine Details. \
        Kennzeichnen Sie fehlende Angaben mit dem Platzhalter \"{PLACEHOLDER}\". \
        Das Feld \"Unterschrift\" bleibt genau so stehen, wie es in der Vorlage angegeben ist.\n\n\
        ZUSAMMENGEFASSTE INFORMATIONEN:\n{context}\n\nVORLAGE:\n{FINAL_REPORT_TEMPLATE}"
    )
}

/// Context line handed to the final step so the case number field gets the caller's id.
pub fn case_id_instruction(case_id: &str) -> String {
    format!(
        "**Fallnummer**:\nTragen Sie im Feld \"Fallnummer\" exakt folgenden Wert ein: {case_id}\n\n"
    )
}
