//! Demonstration data
//!
//! Synthetic progress series, seed programs and seed invitations for demos
//! and tests. Every generator takes an explicit seed so output is
//! reproducible.

use crate::aggregate::round1;
use crate::analytics::{AnalysisMetric, AnalysisPhase, DataPoint};
use crate::directory::{FamilyMember, MemberRole, Student, StudentStatus, TeamMember};
use crate::programs::{
    BehaviorFunction, BehaviorManagementProgram, Program, ProgramInfo, ProgramSet, ProgramStatus,
    ProgramStep, SkillAcquisitionProgram,
};
use crate::sharing::{AccessLevel, InvitationStatus, SharedAccess};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

/// Small deterministic generator (SplitMix64)
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, n)`
    pub fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * n as f64).floor() as u32
    }
}

const CLINICAL_NOTE: &str = "Observación clínica relevante";

/// Daily progress series for a program, skipping weekends.
///
/// Day 0..=10 is baseline, 11..=25 intervention and later days maintenance.
/// During intervention percentages drift up (while below 90) and frequencies
/// drift down (while above 0).
pub fn generate_analytics_series(
    program_id: &str,
    metric: AnalysisMetric,
    start: NaiveDate,
    days: u32,
    seed: u64,
) -> Vec<DataPoint> {
    let mut rng = SeededRng::new(seed);
    let mut value = match metric {
        AnalysisMetric::Percentage => 20.0,
        _ => 5.0,
    };
    let mut points = Vec::new();

    for i in 0..days {
        // Series that would run past the last representable date stop there
        let Some(date) = start.checked_add_days(Days::new(u64::from(i))) else {
            break;
        };
        let phase = if i > 25 {
            AnalysisPhase::Maintenance
        } else if i > 10 {
            AnalysisPhase::Intervention
        } else {
            AnalysisPhase::Baseline
        };

        let mut change = (rng.next_f64() - 0.5) * 10.0;
        if phase == AnalysisPhase::Intervention {
            match metric {
                AnalysisMetric::Percentage if value < 90.0 => change += 2.0,
                AnalysisMetric::Frequency if value > 0.0 => change -= 0.5,
                _ => {}
            }
        }
        value += change;

        match metric {
            AnalysisMetric::Percentage => value = value.clamp(0.0, 100.0),
            AnalysisMetric::Frequency => value = value.max(0.0),
            _ => {}
        }

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        let therapist_id = if rng.next_f64() > 0.5 {
            "ther-001"
        } else {
            "ther-002"
        };
        let notes = (rng.next_f64() > 0.8).then(|| CLINICAL_NOTE.to_string());

        points.push(DataPoint {
            id: format!("dp-{}-{}", program_id, i),
            session_id: format!("sess-{}", i),
            student_id: "std-001".to_string(),
            program_id: program_id.to_string(),
            therapist_id: therapist_id.to_string(),
            date,
            value: round1(value),
            notes,
            phase,
        });
    }

    points
}

/// Per-session response breakdown for the learning-curve chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDataPoint {
    pub session: u32,
    pub date: NaiveDate,
    pub independent: u32,
    pub prompted: u32,
    pub error: u32,
    pub percentage: u32,
    pub phase: AnalysisPhase,
}

/// Vertical marker where a new phase begins
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    pub session: u32,
    pub phase_name: &'static str,
    pub color: &'static str,
}

pub const PHASE_CHANGES: [PhaseChange; 3] = [
    PhaseChange {
        session: 1,
        phase_name: "Línea Base",
        color: "#868e96",
    },
    PhaseChange {
        session: 6,
        phase_name: "Intervención",
        color: "#228be6",
    },
    PhaseChange {
        session: 16,
        phase_name: "Mantenimiento",
        color: "#40c057",
    },
];

/// Twenty-session learning curve: baseline 1-5, intervention 6-15 with
/// linear improvement, maintenance 16-20
pub fn generate_session_series(program_id: &str, seed: u64) -> Vec<SessionDataPoint> {
    let mut rng = SeededRng::new(seed);
    let mut series = Vec::with_capacity(20);

    for session in 1..=20u32 {
        let date = NaiveDate::from_ymd_opt(2026, 1, session).unwrap_or_default();
        let point = match session {
            1..=5 => SessionDataPoint {
                session,
                date,
                independent: rng.below(20) + 10,
                prompted: rng.below(30) + 40,
                error: rng.below(20) + 10,
                percentage: rng.below(20) + 10,
                phase: AnalysisPhase::Baseline,
            },
            6..=15 => {
                let progress = (session - 6) as f64 / 10.0;
                let mut jitter = |base: f64, scale: f64| -> u32 {
                    (base + scale * rng.next_f64()).floor().max(0.0) as u32
                };
                SessionDataPoint {
                    session,
                    date,
                    independent: jitter(30.0 + progress * 40.0, 10.0),
                    prompted: jitter(40.0 - progress * 30.0, 10.0),
                    error: jitter(20.0 - progress * 15.0, 5.0),
                    percentage: jitter(30.0 + progress * 50.0, 10.0),
                    phase: AnalysisPhase::Intervention,
                }
            }
            _ => SessionDataPoint {
                session,
                date,
                independent: rng.below(10) + 85,
                prompted: rng.below(5) + 5,
                error: rng.below(5),
                percentage: rng.below(10) + 85,
                phase: AnalysisPhase::Maintenance,
            },
        };
        series.push(point);
    }

    tracing::debug!(program_id, sessions = series.len(), "Generated session series");
    series
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn info(
    id: &str,
    name: &str,
    status: ProgramStatus,
    created: NaiveDate,
    modified: NaiveDate,
    author: &str,
) -> ProgramInfo {
    ProgramInfo {
        id: id.to_string(),
        student_id: "std-001".to_string(),
        name: name.to_string(),
        status,
        created_date: created,
        last_modified: modified,
        created_by: author.to_string(),
    }
}

fn steps(first_id: u32, descriptions: &[&str]) -> Vec<ProgramStep> {
    descriptions
        .iter()
        .zip(first_id..)
        .enumerate()
        .map(|(i, (description, id))| ProgramStep {
            id: format!("step-{:03}", id),
            order: i as u32 + 1,
            description: description.to_string(),
        })
        .collect()
}

fn set(id: &str, name: &str, items: &[&str]) -> ProgramSet {
    ProgramSet {
        id: id.to_string(),
        name: name.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

fn skill(
    info: ProgramInfo,
    objective: &str,
    antecedent: &str,
    steps: Vec<ProgramStep>,
    procedure: &str,
    sets: Vec<ProgramSet>,
) -> Program {
    Program::SkillAcquisition(SkillAcquisitionProgram {
        info,
        objective: objective.to_string(),
        antecedent: antecedent.to_string(),
        steps,
        procedure: procedure.to_string(),
        sets,
        prompts: None,
        error_correction: None,
        mastery_criteria: None,
        generalization: None,
    })
}

fn behavior(
    info: ProgramInfo,
    topography: &str,
    definition: &str,
    functions: Vec<BehaviorFunction>,
    procedure: &str,
) -> Program {
    Program::BehaviorManagement(BehaviorManagementProgram {
        info,
        topography: topography.to_string(),
        operational_definition: definition.to_string(),
        current_dimension: None,
        functions,
        precursor_behaviors: None,
        replacement_behavior: None,
        procedure: procedure.to_string(),
        mastery_criteria: None,
        crisis_plan: None,
    })
}

/// The demo student's programs, `prog-001` to `prog-007`
pub fn seed_programs() -> Vec<Program> {
    const MARIA: &str = "María González";
    const CARLOS: &str = "Carlos Ramírez";

    vec![
        skill(
            info("prog-001", "Contacto Visual", ProgramStatus::Active, date(2023, 2, 15), date(2026, 1, 20), MARIA),
            "El estudiante establecerá contacto visual con el terapeuta durante 3 segundos cuando se le presente su nombre.",
            "Terapeuta dice el nombre del estudiante",
            steps(1, &[
                "Llamar al estudiante por su nombre",
                "Esperar 2 segundos para respuesta",
                "Registrar si hubo contacto visual",
            ]),
            "Se presenta el nombre del estudiante en un ambiente sin distracciones. Si establece contacto visual dentro de 2 segundos se refuerza de inmediato; si no responde se usa ayuda gestual.",
            Vec::new(),
        ),
        skill(
            info("prog-002", "Imitación Motora Gruesa", ProgramStatus::Active, date(2023, 3, 10), date(2026, 1, 18), MARIA),
            "El estudiante imitará 5 acciones motoras gruesas con precisión del 80%.",
            "Terapeuta modela la acción y dice \"Haz esto\"",
            steps(4, &[
                "Terapeuta modela la acción",
                "Dar instrucción verbal \"Haz esto\"",
                "Esperar 3 segundos para imitación",
                "Reforzar o proporcionar ayuda",
            ]),
            "El terapeuta modela una acción motora gruesa y espera 3 segundos. La imitación correcta se refuerza; si no imita se proporciona ayuda física parcial.",
            vec![set("set-001", "Acciones Básicas", &["Aplaudir", "Levantar brazos", "Tocar cabeza", "Saltar", "Girar"])],
        ),
        skill(
            info("prog-003", "Identificación de Colores", ProgramStatus::Achieved, date(2023, 4, 5), date(2025, 12, 10), MARIA),
            "El estudiante identificará correctamente 6 colores básicos cuando se le pregunte \"¿Qué color es este?\"",
            "Terapeuta presenta tarjeta de color y pregunta",
            steps(8, &[
                "Presentar tarjeta de color",
                "Preguntar \"¿Qué color es este?\"",
                "Esperar respuesta verbal",
                "Reforzar respuesta correcta",
            ]),
            "Se presentan tarjetas de colores en orden aleatorio. Las respuestas correctas se refuerzan y las incorrectas se corrigen con modelo verbal.",
            vec![set("set-002", "Colores Básicos", &["Rojo", "Azul", "Amarillo", "Verde", "Naranja", "Morado"])],
        ),
        skill(
            info("prog-004", "Seguimiento de Instrucciones Simples", ProgramStatus::Paused, date(2023, 5, 20), date(2025, 11, 15), MARIA),
            "El estudiante seguirá 10 instrucciones simples de un paso con 90% de precisión.",
            "Terapeuta da instrucción verbal",
            steps(12, &[
                "Captar atención del estudiante",
                "Dar instrucción clara",
                "Esperar 5 segundos",
                "Registrar cumplimiento",
            ]),
            "La instrucción se da una sola vez y se esperan 5 segundos. Si cumple se refuerza; si no, se repite con ayuda física.",
            vec![set("set-003", "Instrucciones Básicas", &[
                "Siéntate", "Párate", "Ven aquí", "Dame", "Toca", "Señala", "Aplaude", "Salta", "Gira", "Camina",
            ])],
        ),
        behavior(
            info("prog-005", "Reducción de Rabietas", ProgramStatus::Active, date(2023, 6, 1), date(2026, 1, 22), CARLOS),
            "Gritos, llanto intenso, tirarse al suelo, golpear superficies",
            "Episodio de llanto intenso acompañado de gritos, tirarse al suelo o golpear superficies, que dure más de 10 segundos continuos.",
            vec![BehaviorFunction::Escape, BehaviorFunction::Attention],
            "Extinción de escape, atención mínima y reforzamiento diferencial al calmarse y cumplir la instrucción original.",
        ),
        behavior(
            info("prog-006", "Manejo de Conducta Autolesiva", ProgramStatus::Active, date(2023, 7, 15), date(2026, 1, 21), CARLOS),
            "Golpearse la cabeza con las manos, morderse las manos",
            "Contacto de las manos con la cabeza con fuerza suficiente para producir sonido audible, o morderse la piel de las manos.",
            vec![BehaviorFunction::Sensory, BehaviorFunction::Escape],
            "Bloqueo de respuesta, reforzamiento no contingente cada 2 minutos y enseñanza de conducta alternativa.",
        ),
        behavior(
            info("prog-007", "Reducción de Ecolalia No Funcional", ProgramStatus::Discontinued, date(2023, 8, 10), date(2025, 10, 30), MARIA),
            "Repetición de frases de programas de TV, canciones o conversaciones previas",
            "Repetición verbal de frases no apropiadas para el contexto actual, sin función comunicativa aparente.",
            vec![BehaviorFunction::Sensory],
            "Interrupción y redirección, y reforzamiento diferencial de lenguaje funcional.",
        ),
    ]
}

fn member(
    id: &str,
    name: &str,
    profession: &str,
    title: &str,
    description: &str,
    role: MemberRole,
    joined: NaiveDate,
) -> TeamMember {
    let email = match id {
        "sup-001" => "hector@abaprototipo.com".to_string(),
        _ => format!("{}@abaprototipo.com", ascii_handle(name)),
    };
    TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        profession: profession.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        role,
        email,
        phone: None,
        joined_date: joined,
    }
}

/// `María González` → `maria.gonzalez`
fn ascii_handle(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            ' ' => '.',
            other => other,
        })
        .collect()
}

/// The clinical supervisor followed by six therapists
pub fn seed_team() -> Vec<TeamMember> {
    let mut supervisor = member(
        "sup-001",
        "Héctor Dev",
        "BCBA",
        "Supervisor Clínico",
        "Analista de Conducta certificado con 10+ años de experiencia en intervenciones ABA para TEA.",
        MemberRole::Admin,
        date(2020, 1, 15),
    );
    supervisor.phone = Some("+56 9 1234 5678".to_string());

    vec![
        supervisor,
        member(
            "ther-001",
            "María González",
            "RBT",
            "Terapeuta Conductual",
            "Especialista en programas de habilidades sociales y comunicación funcional.",
            MemberRole::Therapist,
            date(2021, 3, 20),
        ),
        member(
            "ther-002",
            "Carlos Ramírez",
            "BCaBA",
            "Asistente de Analista",
            "Enfocado en reducción de conductas desafiantes y análisis funcional.",
            MemberRole::Therapist,
            date(2021, 6, 10),
        ),
        member(
            "ther-003",
            "Ana Martínez",
            "RBT",
            "Terapeuta Conductual",
            "Experiencia en programas de autonomía personal y habilidades adaptativas.",
            MemberRole::Therapist,
            date(2022, 1, 15),
        ),
        member(
            "ther-004",
            "Luis Torres",
            "RBT",
            "Terapeuta Conductual",
            "Especializado en intervenciones tempranas y programas de imitación.",
            MemberRole::Therapist,
            date(2022, 8, 1),
        ),
        member(
            "ther-005",
            "Patricia Silva",
            "BCaBA",
            "Asistente de Analista",
            "Coordinadora de programas de generalización y entrenamiento a padres.",
            MemberRole::Therapist,
            date(2023, 2, 10),
        ),
        member(
            "ther-006",
            "Jorge Vargas",
            "RBT",
            "Terapeuta Conductual",
            "Experto en manejo de conductas en entornos escolares y comunitarios.",
            MemberRole::Therapist,
            date(2023, 5, 20),
        ),
    ]
}

fn contact(id: &str, name: &str, relationship: &str, phone: &str, primary: bool) -> FamilyMember {
    FamilyMember {
        id: id.to_string(),
        name: name.to_string(),
        relationship: relationship.to_string(),
        phone: phone.to_string(),
        email: None,
        is_primary_contact: primary,
    }
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    full_name: &str,
    identity_number: &str,
    born: NaiveDate,
    diagnosis: &str,
    reason: &str,
    registered: NaiveDate,
    therapist: &str,
) -> Student {
    Student {
        id: id.to_string(),
        full_name: full_name.to_string(),
        identity_number: identity_number.to_string(),
        date_of_birth: born,
        diagnosis: diagnosis.to_string(),
        consultation_reason: reason.to_string(),
        has_active_session: false,
        family_access_enabled: true,
        family_members: Vec::new(),
        registration_date: registered,
        last_session_date: None,
        assigned_therapist: Some(therapist.to_string()),
        status: StudentStatus::Active,
    }
}

/// Student folders `std-001`..`std-005`, each assigned to one therapist
pub fn seed_students() -> Vec<Student> {
    let mut santiago = student(
        "std-001",
        STUDENTS[0].1,
        "12.345.678-9",
        date(2018, 3, 15),
        "TEA Nivel 2",
        "Dificultades en comunicación social y patrones de comportamiento repetitivos",
        date(2023, 1, 10),
        "ther-001",
    );
    santiago.has_active_session = true;
    santiago.last_session_date = Some(date(2026, 1, 23));
    santiago.family_members = vec![
        contact("fam-001", "Carmen Pérez López", "Madre", "+56 9 8765 4321", true),
        contact("fam-002", "Roberto García Silva", "Padre", "+56 9 8765 4322", false),
    ];

    let mut valentina = student(
        "std-002",
        STUDENTS[1].1,
        "23.456.789-0",
        date(2019, 7, 22),
        "TEA Nivel 1",
        "Dificultades en interacción social y flexibilidad cognitiva",
        date(2023, 3, 15),
        "ther-002",
    );
    valentina.last_session_date = Some(date(2026, 1, 20));
    valentina.family_members = vec![contact(
        "fam-003",
        "Laura Muñoz Castro",
        "Madre",
        "+56 9 7654 3210",
        true,
    )];

    let mut mateo = student(
        "std-003",
        STUDENTS[2].1,
        "34.567.890-1",
        date(2017, 11, 8),
        "TEA Nivel 3",
        "Necesidad de apoyo sustancial en comunicación y conductas adaptativas",
        date(2022, 9, 20),
        "ther-003",
    );
    mateo.has_active_session = true;
    mateo.family_access_enabled = false;
    mateo.last_session_date = Some(date(2026, 1, 24));
    mateo.family_members = vec![contact(
        "fam-005",
        "Andrea Fernández Rojas",
        "Madre",
        "+56 9 6543 2109",
        true,
    )];

    let mut sofia = student(
        "std-004",
        STUDENTS[3].1,
        "45.678.901-2",
        date(2020, 2, 14),
        "Retraso Global del Desarrollo",
        "Retraso en habilidades motoras y del lenguaje",
        date(2024, 6, 1),
        "ther-004",
    );
    sofia.family_members = vec![contact(
        "fam-007",
        "Claudia Soto Vargas",
        "Madre",
        "+56 9 5432 1098",
        true,
    )];

    let lucas = student(
        "std-005",
        STUDENTS[4].1,
        "56.789.012-3",
        date(2019, 10, 3),
        "TEA Nivel 1",
        "Evaluación interdisciplinaria de lenguaje y conducta adaptativa",
        date(2025, 3, 12),
        "ther-005",
    );

    vec![santiago, valentina, mateo, sofia, lucas]
}

const PROFESSIONALS: [(&str, &str, &str); 8] = [
    ("Dr. Roberto Sánchez", "Psicólogo Clínico", "roberto.sanchez@example.com"),
    ("Lic. Carmen Flores", "Terapeuta Ocupacional", "carmen.flores@example.com"),
    ("Mg. Laura Mendoza", "Fonoaudióloga", "laura.mendoza@example.com"),
    ("Dr. Andrés Vargas", "Neurólogo Infantil", "andres.vargas@example.com"),
    ("Lic. Patricia Ruiz", "Psicopedagoga", "patricia.ruiz@example.com"),
    ("Dra. Sofía Morales", "Psiquiatra Infantil", "sofia.morales@example.com"),
    ("Lic. Diego Torres", "Terapeuta ABA", "diego.torres@example.com"),
    ("Mg. Ana Castillo", "Educadora Especial", "ana.castillo@example.com"),
];

const STUDENTS: [(&str, &str); 5] = [
    ("std-001", "Santiago García Pérez"),
    ("std-002", "Valentina Rodríguez Muñoz"),
    ("std-003", "Mateo López Fernández"),
    ("std-004", "Sofía Martínez Soto"),
    ("std-005", "Lucas Hernández Díaz"),
];

const INVITATION_MESSAGES: [&str; 6] = [
    "Solicito tu colaboración para la evaluación inicial del estudiante.",
    "Necesito tu apoyo profesional en el seguimiento del caso.",
    "Te comparto acceso para coordinación interdisciplinaria.",
    "Requiero tu evaluación especializada para el plan de intervención.",
    "Comparto acceso para revisión de programas educativos.",
    "Necesito tu opinión profesional sobre el progreso del estudiante.",
];

/// Invitations from supervisor `sup-001`, newest first.
///
/// The first 40% are pending, up to 90% accepted and the rest rejected;
/// share dates fall within the 30 days before `now`.
pub fn seed_invitations(count: usize, now: DateTime<Utc>, seed: u64) -> Vec<SharedAccess> {
    let mut rng = SeededRng::new(seed);
    let pending_until = count * 4 / 10;
    let accepted_until = count * 9 / 10;

    let mut invitations: Vec<SharedAccess> = (0..count)
        .map(|i| {
            let (name, title, email) = PROFESSIONALS[i % PROFESSIONALS.len()];
            let (student_id, student_name) = STUDENTS[i % STUDENTS.len()];
            let status = if i < pending_until {
                InvitationStatus::Pending
            } else if i < accepted_until {
                InvitationStatus::Accepted
            } else {
                InvitationStatus::Rejected
            };
            let days_ago = rng.below(30) as i64;

            SharedAccess {
                id: format!("inv-{:03}", i + 1),
                shared_by: "sup-001".to_string(),
                shared_with: email.to_string(),
                student_id: student_id.to_string(),
                student_name: student_name.to_string(),
                professional_name: Some(name.to_string()),
                professional_title: Some(title.to_string()),
                shared_date: now - Duration::days(days_ago),
                access_level: AccessLevel::ALL[i % AccessLevel::ALL.len()],
                status,
                message: (i % 2 == 0)
                    .then(|| INVITATION_MESSAGES[i % INVITATION_MESSAGES.len()].to_string()),
            }
        })
        .collect();

    invitations.sort_by(|a, b| b.shared_date.cmp(&a.shared_date));
    invitations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn test_rng_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
            assert!(rng.below(20) < 20);
        }
    }

    #[test]
    fn test_analytics_series_deterministic() {
        let a = generate_analytics_series("prog-001", AnalysisMetric::Percentage, monday(), 60, 42);
        let b = generate_analytics_series("prog-001", AnalysisMetric::Percentage, monday(), 60, 42);
        let c = generate_analytics_series("prog-001", AnalysisMetric::Percentage, monday(), 60, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_analytics_series_shape() {
        let points =
            generate_analytics_series("prog-001", AnalysisMetric::Percentage, monday(), 60, 1);
        // 60 days from a Monday hold 8 full weeks plus 4 weekdays
        assert_eq!(points.len(), 44);

        for point in &points {
            assert!(!matches!(point.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!((0.0..=100.0).contains(&point.value));
            assert_eq!(round1(point.value), point.value);
            assert!(point.therapist_id == "ther-001" || point.therapist_id == "ther-002");

            let day = (point.date - monday()).num_days();
            let expected = if day > 25 {
                AnalysisPhase::Maintenance
            } else if day > 10 {
                AnalysisPhase::Intervention
            } else {
                AnalysisPhase::Baseline
            };
            assert_eq!(point.phase, expected);
            assert_eq!(point.id, format!("dp-prog-001-{}", day));
        }
    }

    #[test]
    fn test_seed_references_resolve() {
        let team = seed_team();
        let students = seed_students();
        let has_member = |id: &str| team.iter().any(|m| m.id == id);
        let has_student = |id: &str| students.iter().any(|s| s.id == id);

        assert_eq!(team.len(), 7);
        assert_eq!(team[1].email, "maria.gonzalez@abaprototipo.com");
        assert_eq!(team[2].email, "carlos.ramirez@abaprototipo.com");
        assert!(students
            .iter()
            .all(|s| s.assigned_therapist.as_deref().is_some_and(|id| has_member(id))));
        assert!(seed_programs().iter().all(|p| has_student(p.student_id())));

        let now = Utc.with_ymd_and_hms(2026, 1, 25, 12, 0, 0).unwrap();
        for invitation in seed_invitations(15, now, 9) {
            assert!(has_member(&invitation.shared_by));
            assert!(has_student(&invitation.student_id));
        }
        for point in generate_analytics_series("prog-001", AnalysisMetric::Rate, monday(), 20, 4) {
            assert!(has_member(&point.therapist_id));
            assert!(has_student(&point.student_id));
        }
    }

    #[test]
    fn test_analytics_series_stops_at_calendar_end() {
        let start = NaiveDate::MAX.checked_sub_days(Days::new(10)).unwrap();
        let points =
            generate_analytics_series("prog-001", AnalysisMetric::Percentage, start, u32::MAX, 3);
        assert!(!points.is_empty());
        assert!(points.len() <= 11);
        assert!(points.iter().all(|p| p.date >= start && p.date <= NaiveDate::MAX));
    }

    #[test]
    fn test_frequency_never_negative() {
        for seed in 0..20 {
            let points =
                generate_analytics_series("prog-005", AnalysisMetric::Frequency, monday(), 90, seed);
            assert!(points.iter().all(|p| p.value >= 0.0));
        }
    }

    #[test]
    fn test_session_series_phases() {
        let series = generate_session_series("prog-001", 9);
        assert_eq!(series.len(), 20);
        assert_eq!(series, generate_session_series("prog-001", 9));

        for point in &series {
            match point.session {
                1..=5 => {
                    assert_eq!(point.phase, AnalysisPhase::Baseline);
                    assert!((10..30).contains(&point.independent));
                    assert!((40..70).contains(&point.prompted));
                }
                6..=15 => assert_eq!(point.phase, AnalysisPhase::Intervention),
                _ => {
                    assert_eq!(point.phase, AnalysisPhase::Maintenance);
                    assert!((85..95).contains(&point.percentage));
                    assert!(point.error < 5);
                }
            }
        }
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(PHASE_CHANGES.map(|c| c.session), [1, 6, 16]);
    }

    #[test]
    fn test_seed_programs() {
        let programs = seed_programs();
        assert_eq!(programs.len(), 7);
        assert_eq!(programs[0].id(), "prog-001");
        assert_eq!(programs[2].status(), ProgramStatus::Achieved);
        assert_eq!(programs[6].status(), ProgramStatus::Discontinued);

        match &programs[1] {
            Program::SkillAcquisition(p) => {
                assert_eq!(p.steps.len(), 4);
                assert_eq!(p.steps[0].id, "step-004");
                assert_eq!(p.steps[3].order, 4);
            }
            other => panic!("unexpected program {:?}", other),
        }
    }

    #[test]
    fn test_seed_invitations() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let invitations = seed_invitations(10, now, 3);
        assert_eq!(invitations.len(), 10);

        let count = |status| invitations.iter().filter(|i| i.status == status).count();
        assert_eq!(count(InvitationStatus::Pending), 4);
        assert_eq!(count(InvitationStatus::Accepted), 5);
        assert_eq!(count(InvitationStatus::Rejected), 1);

        for pair in invitations.windows(2) {
            assert!(pair[0].shared_date >= pair[1].shared_date);
        }
        assert!(invitations
            .iter()
            .all(|i| now - i.shared_date < Duration::days(30)));

        let first = invitations.iter().find(|i| i.id == "inv-001").unwrap();
        assert_eq!(first.shared_with, "roberto.sanchez@example.com");
        assert_eq!(first.access_level, AccessLevel::Full);
        assert!(first.message.is_some());
    }
}
