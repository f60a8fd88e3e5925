use wiretronic_models::{PriceMode, ResearchPayload};

/// Research instructions used when a request carries no template.
pub const DEFAULT_PROMPT: &str = "Jag vill ha hjälp med att hitta bästa pris för den här artikeln. Leta hos samtliga leverantörer listade nedan. Svara i en tabell med ledtid, pris, Lagerstatus, samt leverantörens namn och länk till där artikeln kan köpas. Vi vill köpa från svenska, eller europeiska siter. Sortera tabellen utifrån pris, lägsta pris först. Många leverantörer har stafflade priser, se till att du kollar rätt pris. Ibland är nästa nivå i stafflingen så mycket billigare så att det är värt att köpa fler. Informera om detta isåfall! En del har också MOQ- se till att informera användaren om det om det påverkar den volymen de ska köpa.

Sök på dessa leverantörers hemsida:
https://se.farnell.com/
https://se.rs-online.com/web/
https://www.digikey.se/
https://www.tti.com/
https://www.onlinecomponents.com/
https://www.mouser.se/
https://nexelec.com/
https://www.arrow.com/
https://www.auto-click.co.uk/
https://www.automotiveconnectors.com/
https://www.automotive-connectors.com/";

/// System instructions sent with every research call.
pub const INSTRUCTIONS: &str = "Du är en inköpsassistent som alltid returnerar JSON enligt schema.";

/// Compose the model input for one item.
pub fn build_prompt(payload: &ResearchPayload) -> String {
    let template = match payload.prompt_template.trim() {
        "" => DEFAULT_PROMPT,
        template => template,
    };

    let quantity_line = match payload.quantity {
        Some(qty) => format!("Antal att köpa: {}", qty),
        None => "Antal att köpa: okänt".to_string(),
    };

    let price_mode_line = match payload.price_mode {
        PriceMode::Total => "Välj bästa leverantör baserat på lägsta totalpris för angivet antal.",
        PriceMode::Unit => "Välj bästa leverantör baserat på lägsta styckpris.",
    };

    [
        template.to_string(),
        String::new(),
        "Artikel:".to_string(),
        format!("Artikelnummer: {}", payload.part_number),
        quantity_line,
        price_mode_line.to_string(),
        "Returnera endast JSON enligt schema. Lista bara leverantörer som har artikeln i lager eller kan leverera med angiven ledtid.".to_string(),
        "Priser ska vara exklusive moms och ange valuta med ISO-kod (t.ex. SEK, EUR, USD).".to_string(),
    ]
    .join("\n")
}
