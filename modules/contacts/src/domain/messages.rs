//! User-visible texts, including the mapping from provider error messages to
//! fixed localized strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

// Provider message fragments, matched case-insensitively.
const BADLY_FORMATTED_EMAIL: &str = "email address is badly formatted";
const INVALID_PASSWORD: &str = "password is invalid";
const SHORT_PASSWORD: &str = "least 6 characters";
const EMAIL_IN_USE: &str = "email address is already in use";
const NETWORK_ERROR: &str = "network error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    fn pick(&self, en: &'static str, es: &'static str) -> &'static str {
        match self.locale {
            Locale::En => en,
            Locale::Es => es,
        }
    }

    // --- provider error mapping ---

    /// Message shown when signing in fails.
    pub fn login_error(&self, provider_message: &str) -> &'static str {
        let m = provider_message.to_lowercase();
        if m.contains(BADLY_FORMATTED_EMAIL) {
            self.pick("The email format is invalid", "El formato del correo es inválido")
        } else if m.contains(INVALID_PASSWORD) || m.contains(SHORT_PASSWORD) {
            self.weak_password()
        } else if m.contains(NETWORK_ERROR) {
            self.no_connection()
        } else {
            self.pick("Incorrect email or password", "Correo o Contraseña Incorrectos")
        }
    }

    /// Message shown when creating an account fails.
    pub fn register_error(&self, provider_message: &str) -> &'static str {
        let m = provider_message.to_lowercase();
        if m.contains(BADLY_FORMATTED_EMAIL) {
            self.pick("The email format is invalid.", "El formato del correo es inválido.")
        } else if m.contains(INVALID_PASSWORD) || m.contains(SHORT_PASSWORD) {
            self.weak_password()
        } else if m.contains(EMAIL_IN_USE) {
            self.pick("The email is already registered.", "El correo ya está registrado.")
        } else if m.contains(NETWORK_ERROR) {
            self.no_connection()
        } else {
            self.pick(
                "Could not register the new user. Please try again later.",
                "No se pudo registrar el nuevo usuario. Intenta nuevamente más tarde.",
            )
        }
    }

    fn weak_password(&self) -> &'static str {
        self.pick(
            "The password must be at least 6 characters",
            "La contraseña debe tener al menos 6 caracteres",
        )
    }

    fn no_connection(&self) -> &'static str {
        self.pick("No internet connection", "No hay conexión a internet")
    }

    // --- validation ---

    pub fn incomplete_contact(&self) -> &'static str {
        self.pick(
            "Please fill in all fields before saving.",
            "Por favor completa todos los campos antes de registrarte.",
        )
    }

    pub fn invalid_email(&self) -> &'static str {
        self.pick("Enter a valid email address.", "Ingresa un correo válido.")
    }

    pub fn invalid_phone(&self) -> &'static str {
        self.pick(
            "Enter a valid 10-digit phone number.",
            "Ingresa un número de teléfono válido de 10 dígitos.",
        )
    }

    pub fn missing_credentials(&self) -> &'static str {
        self.pick(
            "Please enter your email and password",
            "Por favor ingresa tu correo y contraseña",
        )
    }

    pub fn enter_password(&self) -> &'static str {
        self.pick("Enter the password", "Ingresa la contraseña")
    }

    pub fn password_mismatch(&self) -> &'static str {
        self.pick(
            "Passwords do not match or are too short",
            "Las contraseñas no coinciden o son muy cortas",
        )
    }

    // --- session ---

    pub fn not_signed_in(&self) -> &'static str {
        self.pick(
            "Could not get the current user.",
            "No se pudo obtener el usuario actual.",
        )
    }

    pub fn missing_user_email(&self) -> &'static str {
        self.pick(
            "No email address was found for the current user.",
            "No se encontró el correo electrónico del usuario actual.",
        )
    }

    pub fn authentication_failed(&self) -> &'static str {
        self.pick("Authentication error", "Error de autenticación")
    }

    pub fn default_user_name(&self) -> &'static str {
        self.pick("User", "Usuario")
    }

    // --- store & pictures ---

    pub fn contact_not_found(&self) -> &'static str {
        self.pick("Contact not found.", "No se encontró el contacto.")
    }

    pub fn store_failure(&self, detail: &str) -> String {
        match self.locale {
            Locale::En => format!("Something went wrong: {detail}"),
            Locale::Es => format!("Ocurrió un error: {detail}"),
        }
    }

    pub fn image_unusable(&self) -> &'static str {
        self.pick(
            "The selected image could not be decoded.",
            "No se pudo decodificar la imagen seleccionada.",
        )
    }

    pub fn camera_permission_denied(&self) -> &'static str {
        self.pick("Camera permission denied", "Permiso denegado")
    }

    pub fn capture_failed(&self) -> &'static str {
        self.pick("The picture could not be taken", "No se pudo tomar la foto")
    }

    // --- notices ---

    pub fn contact_deleted(&self) -> &'static str {
        self.pick("Contact deleted successfully", "Contacto eliminado exitosamente")
    }

    pub fn password_reset_sent(&self) -> &'static str {
        self.pick(
            "We have sent you an email to reset your password.",
            "Te hemos enviado un correo para restablecer tu contraseña.",
        )
    }

    pub fn password_reset_failed(&self, detail: &str) -> String {
        match self.locale {
            Locale::En => format!("Error sending the email: {detail}"),
            Locale::Es => format!("Error al enviar el correo: {detail}"),
        }
    }

    pub fn password_updated(&self) -> &'static str {
        self.pick("Password changed successfully", "Cambio de Contraseña Exitoso")
    }

    pub fn password_update_failed(&self, detail: &str) -> String {
        match self.locale {
            Locale::En => format!("Error updating the password: {detail}"),
            Locale::Es => format!("Error al actualizar la contraseña: {detail}"),
        }
    }

    pub fn email_verification_sent(&self) -> &'static str {
        self.pick(
            "Email updated. Check your inbox or spam folder.",
            "Correo actualizado. Revisa tu bandeja de entrada o Spam.",
        )
    }

    pub fn email_update_failed(&self, detail: &str) -> String {
        match self.locale {
            Locale::En => format!("Error updating email: {detail}"),
            Locale::Es => format!("Error al actualizar correo: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_mapping_follows_provider_fragments() {
        let m = Messages::new(Locale::En);
        assert_eq!(
            m.login_error("The email address is badly formatted."),
            "The email format is invalid"
        );
        assert_eq!(
            m.login_error("The given password is invalid. [ Password should be at least 6 characters ]"),
            "The password must be at least 6 characters"
        );
        assert_eq!(
            m.login_error("A NETWORK ERROR (such as timeout) has occurred."),
            "No internet connection"
        );
        assert_eq!(
            m.login_error("The supplied auth credential is incorrect"),
            "Incorrect email or password"
        );
    }

    #[test]
    fn register_mapping_detects_existing_account() {
        let m = Messages::new(Locale::Es);
        assert_eq!(
            m.register_error("The email address is already in use by another account."),
            "El correo ya está registrado."
        );
        assert_eq!(
            m.register_error("internal"),
            "No se pudo registrar el nuevo usuario. Intenta nuevamente más tarde."
        );
    }

    #[test]
    fn locale_parses_lowercase() {
        let l: Locale = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(l, Locale::Es);
        assert_eq!(Locale::default(), Locale::En);
    }
}
