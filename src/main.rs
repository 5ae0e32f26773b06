use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use colored::*;
use dotenvy::dotenv;
use tracing::{error, info};

use gate_entry::config::environment::EnvironmentConfig;
use gate_entry::dto::gate_dto::{
    EnhancedBatchGateEntryRequest, EnhancedManualGateEntryRequest, ManualGateEntryRequest,
    MultipleManualEntryRequest,
};
use gate_entry::dto::insights_dto::{MovementFilter, OperationalUpdate};
use gate_entry::models::auth::CurrentUser;
use gate_entry::models::movement::MovementType;
use gate_entry::rules::assignment::candidate_documents;
use gate_entry::rules::edit_state::edit_permission_message;
use gate_entry::rules::gate_sequence::{can_perform, derive_vehicle_status, vehicle_status_text};
use gate_entry::rules::operational::{
    check_against_previous, format_km_display, normalize_loader_names, suggested_range, KmCheck,
    KmReadingType,
};
use gate_entry::rules::priority::WorklistItem;
use gate_entry::rules::statistics::unassigned_count;
use gate_entry::rules::submission::{
    build_batch_request, check_manual_count, clean_optional, clean_vehicle_number,
    format_assignment_success,
    format_batch_success, format_manual_success, format_multiple_manual_success,
    submit_button_text,
};
use gate_entry::services::gate_service::local_now;
use gate_entry::{GateEntryClient, GateError, GateService, MemoryTokenStore};

/// Estado de la consola del operador
struct Console {
    service: GateService,
    user: Option<CurrentUser>,
    worklist: Vec<WorklistItem>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();

    info!("🚧 Gate Entry - consola del operador");
    info!("🌐 Backend: {} ({})", config.api_base_url, config.environment);

    let client = GateEntryClient::new(config, Arc::new(MemoryTokenStore::new()))?;
    let mut console = Console {
        service: GateService::new(client),
        user: None,
        worklist: Vec::new(),
    };

    println!("{}", "🚧 Gate Entry Console".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());

    loop {
        // Un token expirado cierra la sesión local
        if console.user.is_some() {
            if let Ok(None) = console.service.client().current_user().await {
                println!("{}", "⏰ La sesión expiró. Inicia sesión de nuevo.".yellow());
                console.user = None;
                console.worklist.clear();
            }
        }

        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        match &console.user {
            Some(user) => println!("👤 {} ({})", user.full_name(), user.role.as_str()),
            None => println!("{}", "👤 Sin sesión".bright_black()),
        }
        println!("1. 🔐 Login");
        println!("2. 🔍 Consultar vehículo");
        println!("3. 📦 Entrada por lote");
        println!("4. ✍️  Entrada manual");
        println!("5. 🧾 Entrada manual múltiple");
        println!("6. 📋 Lista de trabajo (hoy)");
        println!("7. ✏️  Editar datos operativos");
        println!("8. 🔗 Asignar documento");
        println!("9. 📊 Estadísticas");
        println!("10. 🕘 Historial de vehículo");
        println!("11. 👋 Logout");
        println!("0. 🚪 Salir");

        let choice = prompt("Selecciona una opción: ")?;
        let outcome = match choice.as_str() {
            "1" => console.login().await,
            "2" => console.check_vehicle().await,
            "3" => console.batch_entry().await,
            "4" => console.manual_entry().await,
            "5" => console.multiple_manual_entry().await,
            "6" => console.show_worklist().await,
            "7" => console.edit_record().await,
            "8" => console.assign_document().await,
            "9" => console.statistics().await,
            "10" => console.vehicle_history().await,
            "11" => console.logout().await,
            "0" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            console.report(&e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_optional(label: &str) -> io::Result<Option<String>> {
    Ok(clean_optional(Some(&prompt(label)?)))
}

fn prompt_gate_type() -> io::Result<Option<MovementType>> {
    Ok(match prompt("Movimiento (1 = Gate-In, 2 = Gate-Out): ")?.as_str() {
        "1" => Some(MovementType::GateIn),
        "2" => Some(MovementType::GateOut),
        _ => None,
    })
}

/// Driver, KM y cargadores opcionales (vacío = sin dato)
fn prompt_operational(
    gate_type: MovementType,
) -> io::Result<(Option<String>, Option<String>, Option<String>)> {
    let km_type = KmReadingType::for_movement(gate_type);
    let driver_name = prompt_optional("Conductor (opcional): ")?;
    let km_reading = prompt_optional(&format!("{} ({}): ", km_type.label(), km_type.placeholder()))?;
    let loader_names = prompt_optional("Cargadores separados por coma (opcional): ")?;
    Ok((driver_name, km_reading, loader_names))
}

fn confirm(label: &str) -> io::Result<bool> {
    Ok(matches!(prompt(label)?.to_lowercase().as_str(), "s" | "si" | "y" | "yes"))
}

fn pick_index(label: &str, len: usize) -> io::Result<Option<usize>> {
    let value = prompt(label)?;
    Ok(value
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1))
}

impl Console {
    fn report(&mut self, err: &anyhow::Error) {
        match err.downcast_ref::<GateError>() {
            Some(gate_error) => {
                println!("{}", format!("❌ {}", gate_error.user_message()).bright_red());
                if gate_error.requires_login() {
                    self.user = None;
                    self.worklist.clear();
                }
            }
            // Rechazos de reglas (secuencia, campos, envío): su Display ya es el mensaje
            None => {
                if err.downcast_ref::<io::Error>().is_some() {
                    error!("❌ Error de consola: {}", err);
                }
                println!("{}", format!("❌ {}", err).bright_red());
            }
        }
    }

    fn require_user(&self) -> Result<&CurrentUser> {
        self.user
            .as_ref()
            .ok_or_else(|| GateError::Unauthorized("No active session".to_string()).into())
    }

    async fn login(&mut self) -> Result<()> {
        println!("{}", "🔐 LOGIN".bright_cyan().bold());
        let username = prompt("Usuario: ")?;
        let password = prompt("Contraseña: ")?;

        let user = self.service.client().login(&username, &password).await?;
        println!("{}", format!("✅ Bienvenido, {}", user.full_name()).bright_green());
        self.user = Some(user);
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.service.client().logout().await?;
        self.user = None;
        self.worklist.clear();
        println!("{}", "👋 Sesión cerrada".bright_green());
        Ok(())
    }

    async fn check_vehicle(&mut self) -> Result<()> {
        self.require_user()?;
        let lookup = self.service.lookup_vehicle(&prompt("Matrícula: ")?).await?;

        println!("{}", format!("🚚 {}", lookup.vehicle_no).bright_cyan().bold());
        println!("   {}", vehicle_status_text(Some(&lookup.status)));
        println!(
            "   Gate-In: {}  Gate-Out: {}",
            yes_no(can_perform(Some(&lookup.status), MovementType::GateIn)),
            yes_no(can_perform(Some(&lookup.status), MovementType::GateOut))
        );
        println!("   📄 Documentos recientes: {}", lookup.documents.count);
        for doc in &lookup.documents.documents {
            println!(
                "     - {} {} {}",
                doc.document_no,
                doc.document_type.as_deref().unwrap_or("-"),
                doc.customer_name.as_deref().unwrap_or("")
            );
        }
        println!("   ➡️  {}", lookup.action.message);
        Ok(())
    }

    async fn vehicle_history(&mut self) -> Result<()> {
        self.require_user()?;
        let vehicle_no = clean_vehicle_number(&prompt("Matrícula: ")?)?;
        let history = self.service.client().vehicle_history(&vehicle_no).await?;

        println!(
            "{}",
            format!("🕘 {} ({} movimientos)", history.vehicle_no, history.total_movements)
                .bright_cyan()
                .bold()
        );
        for record in &history.history {
            println!(
                "   {} {} {} {}",
                record.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                record.time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                record.movement_type,
                record.document_no.as_deref().unwrap_or("-")
            );
        }
        let derived = derive_vehicle_status(&vehicle_no, &history.history);
        println!("   {}", vehicle_status_text(Some(&derived)));
        Ok(())
    }

    async fn batch_entry(&mut self) -> Result<()> {
        self.require_user()?;
        let lookup = self.service.lookup_vehicle(&prompt("Matrícula: ")?).await?;
        println!("   {}", vehicle_status_text(Some(&lookup.status)));

        for (i, doc) in lookup.documents.documents.iter().enumerate() {
            println!("   {}. {} {}", i + 1, doc.document_no, doc.document_type.as_deref().unwrap_or("-"));
        }
        let selection = prompt("Documentos (ej. 1,3): ")?;
        let selected: Vec<String> = selection
            .split(',')
            .filter_map(|n| n.trim().parse::<usize>().ok())
            .filter_map(|n| n.checked_sub(1))
            .filter_map(|i| lookup.documents.documents.get(i))
            .map(|doc| doc.document_no.clone())
            .collect();
        println!(
            "   [{}]",
            submit_button_text(Some(&lookup.documents), selected.len(), self.service.is_submitting())
        );

        let Some(gate_type) = prompt_gate_type()? else {
            println!("{}", "❌ Movimiento inválido".bright_red());
            return Ok(());
        };
        let remarks = prompt("Observaciones (opcional): ")?;
        let batch = build_batch_request(
            gate_type,
            &lookup.vehicle_no,
            Some(&lookup.documents),
            &selected,
            Some(&remarks),
        )?;
        let (driver_name, km_reading, loader_names) = prompt_operational(gate_type)?;

        let result = if driver_name.is_none() && km_reading.is_none() && loader_names.is_none() {
            self.service.submit_batch(batch).await?
        } else {
            self.service
                .submit_enhanced_batch(EnhancedBatchGateEntryRequest {
                    gate_type: batch.gate_type,
                    vehicle_no: batch.vehicle_no,
                    document_nos: batch.document_nos,
                    remarks: batch.remarks,
                    driver_name,
                    km_reading,
                    loader_names: loader_names.map(|v| normalize_loader_names(Some(&v))).transpose()?,
                })
                .await?
        };

        println!("{}", format_batch_success(&result).bright_green());
        for doc in result.processed_documents.iter().filter(|d| d.is_error()) {
            println!(
                "{}",
                format!("   ⚠️ {}: {}", doc.document_no, doc.error.as_deref().unwrap_or("error")).yellow()
            );
        }
        Ok(())
    }

    async fn manual_entry(&mut self) -> Result<()> {
        self.require_user()?;
        let vehicle_no = prompt("Matrícula: ")?;
        let Some(gate_type) = prompt_gate_type()? else {
            println!("{}", "❌ Movimiento inválido".bright_red());
            return Ok(());
        };
        let entry = ManualGateEntryRequest {
            gate_type,
            vehicle_no,
            document_type: prompt_optional("Tipo de documento (opcional): ")?,
            document_no: prompt_optional("Número de documento (opcional): ")?,
            customer_name: prompt_optional("Cliente (opcional): ")?,
            remarks: prompt_optional("Observaciones (opcional): ")?,
            ..Default::default()
        };
        let (driver_name, km_reading, loader_names) = prompt_operational(gate_type)?;

        let result = if driver_name.is_none() && km_reading.is_none() && loader_names.is_none() {
            self.service.submit_manual(entry).await?
        } else {
            self.service
                .submit_enhanced_manual(EnhancedManualGateEntryRequest {
                    entry,
                    driver_name,
                    km_reading,
                    loader_names: loader_names.map(|v| normalize_loader_names(Some(&v))).transpose()?,
                })
                .await?
        };

        println!("{}", format_manual_success(&result).bright_green());
        Ok(())
    }

    async fn multiple_manual_entry(&mut self) -> Result<()> {
        self.require_user()?;
        let vehicle_no = prompt("Matrícula: ")?;
        let Some(gate_type) = prompt_gate_type()? else {
            println!("{}", "❌ Movimiento inválido".bright_red());
            return Ok(());
        };
        let count = prompt("Número de documentos (1-20): ")?.parse::<u32>().unwrap_or(0);
        let number_of_documents = check_manual_count(count)?;
        let remarks = prompt_optional("Observaciones (opcional): ")?;
        let (driver_name, km_reading, loader_names) = prompt_operational(gate_type)?;

        let result = self
            .service
            .submit_multiple_manual(MultipleManualEntryRequest {
                gate_type,
                vehicle_no,
                number_of_documents,
                remarks,
                driver_name,
                km_reading,
                loader_names: loader_names.map(|v| normalize_loader_names(Some(&v))).transpose()?,
            })
            .await?;

        println!("{}", format_multiple_manual_success(&result).bright_green());
        Ok(())
    }

    async fn show_worklist(&mut self) -> Result<()> {
        let user = self.require_user()?.clone();
        let now = local_now();
        self.worklist = self
            .service
            .worklist(&MovementFilter::for_day(now.date()), &user, now)
            .await?;

        let records: Vec<_> = self.worklist.iter().map(|item| item.record.clone()).collect();
        println!(
            "{}",
            format!(
                "📋 {} registros, {} pendientes de asignar",
                self.worklist.len(),
                unassigned_count(&records, now)
            )
            .bright_cyan()
            .bold()
        );
        for (i, item) in self.worklist.iter().enumerate() {
            let record = &item.record;
            println!(
                "{:>3}. {} {} {} [{}] {}",
                i + 1,
                record.gate_entry_no,
                record.movement_type,
                record.vehicle_no,
                item.button.text,
                item.button.message.bright_black()
            );
            if item.assignment.is_assignable() {
                println!("      🔗 {}", item.assignment.label().yellow());
            }
        }
        Ok(())
    }

    fn pick_worklist_item(&self) -> Result<Option<(usize, WorklistItem)>> {
        if self.worklist.is_empty() {
            println!("{}", "ℹ️ Carga primero la lista de trabajo (opción 6)".bright_blue());
            return Ok(None);
        }
        Ok(pick_index("Registro #: ", self.worklist.len())?.map(|i| (i, self.worklist[i].clone())))
    }

    async fn edit_record(&mut self) -> Result<()> {
        let user = self.require_user()?.clone();
        let Some((_, item)) = self.pick_worklist_item()? else {
            return Ok(());
        };
        let record = item.record;
        let now = local_now();
        println!("   {}", edit_permission_message(&record, &user, now));

        let context = self.service.client().km_reading_context(&record.gate_entry_no).await?;
        let range = context
            .suggested_range
            .unwrap_or_else(|| suggested_range(context.previous_km_reading.as_deref()));
        println!(
            "   KM anterior: {}  (rango sugerido {}-{})",
            format_km_display(context.previous_km_reading.as_deref()),
            range.min,
            range.max
        );

        let (driver_name, km_reading, loader_names) = prompt_operational(record.movement_type)?;
        if let KmCheck::NeedsConfirmation(warning) =
            check_against_previous(km_reading.as_deref(), context.previous_km_reading.as_deref())
        {
            println!("{}", format!("⚠️ {}", warning).yellow());
            if !confirm("¿Continuar? (s/n): ")? {
                return Ok(());
            }
        }

        let update = OperationalUpdate {
            gate_entry_no: record.gate_entry_no.clone(),
            driver_name,
            km_reading,
            loader_names: loader_names.map(|v| normalize_loader_names(Some(&v))).transpose()?,
            remarks: prompt_optional("Observaciones (opcional): ")?,
        };
        let result = self.service.update_operational(&record, &user, update, now).await?;
        println!("{}", format!("✅ {}", result.message).bright_green());
        Ok(())
    }

    async fn assign_document(&mut self) -> Result<()> {
        let user = self.require_user()?.clone();
        let Some((position, item)) = self.pick_worklist_item()? else {
            return Ok(());
        };
        println!("   {}", item.assignment.label());
        if !item.assignment.is_assignable() {
            return Ok(());
        }

        let mut record = item.record;
        let now = local_now();
        let available = self.service.client().available_documents(&record.vehicle_no).await?;
        let candidates = candidate_documents(&available.documents, &record.vehicle_no, now);
        if candidates.is_empty() {
            println!("{}", "ℹ️ No hay documentos disponibles para este vehículo".bright_blue());
            return Ok(());
        }
        for (i, doc) in candidates.iter().enumerate() {
            println!("   {}. {} {}", i + 1, doc.document_no, doc.document_type.as_deref().unwrap_or("-"));
        }

        let Some(index) = pick_index("Documento #: ", candidates.len())? else {
            return Ok(());
        };
        let document = candidates[index].clone();
        self.service.assign_document(&mut record, &document, now).await?;
        println!("{}", format_assignment_success(&document.document_no).bright_green());

        // La fila queda como asignada hasta la próxima recarga
        self.worklist[position] = WorklistItem::new(record, &user, now);
        Ok(())
    }

    async fn statistics(&mut self) -> Result<()> {
        self.require_user()?;
        let client = self.service.client();
        let (stats, unassigned) = futures::try_join!(client.edit_statistics(), client.unassigned_count())?;

        println!("{}", "📊 ESTADÍSTICAS".bright_cyan().bold());
        println!("   Total: {}", stats.total_records);
        println!("   Requieren completar: {}", stats.needs_completion);
        println!("   Completos y editables: {}", stats.complete_and_editable);
        println!("   Expirados: {}", stats.expired);
        println!("   Completitud: {:.1}%", stats.completion_percentage);
        println!(
            "   Faltan: conductor {} / km {} / cargadores {}",
            stats.missing_driver, stats.missing_km, stats.missing_loaders
        );
        println!("   Editados hoy: {}", stats.edited_today);
        println!("   Sin asignar: {}", unassigned.unassigned_count);

        let (pending, summary) = futures::try_join!(
            client.records_needing_completion(),
            client.operational_summary()
        )?;
        println!("   Pendientes de completar: {}", pending.total_records);
        for recommendation in &summary.recommendations {
            println!("   💡 {}", recommendation);
        }

        let now = local_now();
        let today = self
            .service
            .local_statistics(&MovementFilter::for_day(now.date()), now)
            .await?;
        println!(
            "   Hoy: {} registros, {:.1}% completos",
            today.total_records, today.completion_percentage
        );
        Ok(())
    }
}

fn yes_no(value: bool) -> ColoredString {
    if value {
        "✅".green()
    } else {
        "⛔".red()
    }
}
